//! Tier definitions and the compiled-in tier table

use std::fmt;

/// Unlock rule for a tier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TierRule {
    /// Constant countdown, always available
    Fixed(u64),
    /// Next slot that is a multiple of 2^k
    PowerOfTwo(u32),
    /// End of the current epoch
    EpochBoundary,
    /// Undisclosed - never shows a number
    Mystery,
}

impl TierRule {
    /// Largest exponent accepted for `PowerOfTwo`
    pub const MAX_POWER: u32 = 62;

    /// Period of a power-of-two rule in slots
    pub fn period(&self) -> Option<u64> {
        match self {
            TierRule::PowerOfTwo(k) => Some(1u64 << (*k).min(Self::MAX_POWER)),
            _ => None,
        }
    }
}

impl fmt::Display for TierRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierRule::Fixed(v) => write!(f, "fixed({v})"),
            TierRule::PowerOfTwo(k) => write!(f, "power-of-two({k})"),
            TierRule::EpochBoundary => write!(f, "epoch-boundary"),
            TierRule::Mystery => write!(f, "mystery"),
        }
    }
}

/// One rarity tier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tier {
    /// Display name
    pub name: &'static str,
    /// Icon reference for the presentation layer
    pub icon: &'static str,
    pub rule: TierRule,
}

impl Tier {
    pub const fn new(name: &'static str, icon: &'static str, rule: TierRule) -> Self {
        Tier { name, icon, rule }
    }

    #[inline]
    pub fn is_mystery(&self) -> bool {
        self.rule == TierRule::Mystery
    }
}

/// The fixed tier table, in display order
pub static TIERS: [Tier; 8] = [
    Tier::new("Stone", "circle-dot", TierRule::Fixed(1)),
    Tier::new("Jade", "circle-rectangle", TierRule::PowerOfTwo(10)),
    Tier::new("Bronze", "prism", TierRule::EpochBoundary),
    Tier::new("Silver", "puzzle", TierRule::PowerOfTwo(20)),
    Tier::new("Gold", "sun", TierRule::PowerOfTwo(22)),
    Tier::new("Obsidian", "infinity", TierRule::PowerOfTwo(24)),
    Tier::new("Neon", "tallymark", TierRule::PowerOfTwo(26)),
    Tier::new("Necrotic", "skull", TierRule::Mystery),
];

/// Look up a tier by display name
pub fn tier_by_name(name: &str) -> Option<&'static Tier> {
    TIERS.iter().find(|t| t.name == name)
}
