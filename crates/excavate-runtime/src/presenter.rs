//! Presenter - countdown formatting and display snapshots

use excavate_core::{InterpolatedState, WallTime, MYSTERY_PLACEHOLDER, PENDING_PLACEHOLDER};
use excavate_tiers::{evaluate_all, Tier, TIERS};

/// Compact human rendering of a slot count.
///
/// Above a million renders as `1.5m`, above ten thousand as `15.0k`,
/// otherwise the floored non-negative integer with thousands separators.
pub fn format_slot_count(value: f64) -> String {
    if value > 1e6 {
        return format!("{:.1}m", round_tenth(value / 1e6));
    }
    if value > 1e4 {
        return format!("{:.1}k", round_tenth(value / 1e3));
    }
    group_thousands(value.floor().max(0.0) as u64)
}

/// Round to one decimal, ties away from zero (`{:.1}` alone rounds ties to even)
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Render a raw countdown; `None` is the mystery placeholder
pub fn format_countdown(raw: Option<f64>) -> String {
    match raw {
        Some(value) => format_slot_count(value),
        None => MYSTERY_PLACEHOLDER.to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Relative "last updated" text.
/// Empty until the first successful sample.
pub fn format_last_updated(last_success: Option<WallTime>, now: WallTime) -> String {
    let Some(last) = last_success else {
        return String::new();
    };

    let seconds = now.millis_since(last).div_euclid(1000);
    if seconds < 5 {
        "Just now".to_string()
    } else if seconds < 60 {
        format!("{seconds}s ago")
    } else {
        format!("{}m ago", seconds / 60)
    }
}

/// One tier's row on the board
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayEntry {
    pub tier: &'static Tier,
    pub formatted: String,
    pub raw: Option<f64>,
    pub imminent: bool,
}

impl DisplayEntry {
    /// Accessible description of the row
    pub fn label(&self) -> String {
        format!(
            "{} rarity countdown: {} slots remaining",
            self.tier.name, self.formatted
        )
    }
}

/// Every tier's entry, rebuilt wholesale each tick
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayBoard {
    entries: Vec<DisplayEntry>,
}

impl DisplayBoard {
    /// Board shown before the first sample arrives
    pub fn pending() -> Self {
        let entries = TIERS
            .iter()
            .map(|tier| DisplayEntry {
                tier,
                formatted: if tier.is_mystery() {
                    MYSTERY_PLACEHOLDER.to_string()
                } else {
                    PENDING_PLACEHOLDER.to_string()
                },
                raw: None,
                imminent: false,
            })
            .collect();
        DisplayBoard { entries }
    }

    /// Evaluate all tiers against an interpolated state
    pub fn render(state: &InterpolatedState, imminent_threshold: f64) -> Self {
        let entries = evaluate_all(state, imminent_threshold)
            .into_iter()
            .map(|c| DisplayEntry {
                tier: c.tier,
                formatted: format_countdown(c.raw),
                raw: c.raw,
                imminent: c.imminent,
            })
            .collect();
        DisplayBoard { entries }
    }

    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&DisplayEntry> {
        self.entries.iter().find(|e| e.tier.name == name)
    }
}

impl Default for DisplayBoard {
    fn default() -> Self {
        Self::pending()
    }
}

/// Everything a view needs to draw one frame
#[derive(Clone, Debug, PartialEq)]
pub struct DisplaySnapshot {
    pub board: DisplayBoard,
    /// True until the first fetch attempt completes, and during a retry
    pub loading: bool,
    /// User-facing error, dismissable
    pub error: Option<String>,
    /// Relative time since the last successful sample
    pub last_updated: String,
    pub estimate: Option<InterpolatedState>,
}

impl DisplaySnapshot {
    pub fn initial() -> Self {
        DisplaySnapshot {
            board: DisplayBoard::pending(),
            loading: true,
            error: None,
            last_updated: String::new(),
            estimate: None,
        }
    }

    /// The "last updated" line is hidden while an error is showing
    pub fn show_last_updated(&self) -> bool {
        !self.last_updated.is_empty() && self.error.is_none()
    }
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
