//! Compiled-in estimator parameters

use std::time::Duration;

/// Slot duration assumed before any calibration (Solana averages ~400ms)
pub const DEFAULT_SLOT_DURATION_MS: f64 = 400.0;

/// Weight given to a fresh measurement when smoothing the slot duration
pub const SMOOTHING_WEIGHT: f64 = 0.3;

/// Network sampling cadence
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(5000);

/// Fast redraw cadence
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// "Last updated" label cadence
pub const LABEL_INTERVAL: Duration = Duration::from_millis(1000);

/// Countdowns at or below this many slots are flagged imminent
pub const IMMINENT_THRESHOLD: f64 = 100.0;

/// Text shown for a tier whose unlock rule is undisclosed
pub const MYSTERY_PLACEHOLDER: &str = "?????";

/// Text shown before the first sample arrives
pub const PENDING_PLACEHOLDER: &str = "—";

/// User-facing message raised when sampling fails
pub const NETWORK_ERROR_MESSAGE: &str =
    "The excavation network is unreachable. Please check your connection and try again.";
