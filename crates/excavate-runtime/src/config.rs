//! Estimator configuration

use std::time::Duration;

use excavate_core::{
    ExcavateError, ExcavateResult, DEFAULT_SLOT_DURATION_MS, IMMINENT_THRESHOLD, LABEL_INTERVAL,
    REDRAW_INTERVAL, SAMPLE_INTERVAL, SMOOTHING_WEIGHT,
};
use excavate_crypto::Address;

/// Estimator configuration
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Network sampling interval
    pub sample_interval: Duration,
    /// Fast redraw interval
    pub redraw_interval: Duration,
    /// "Last updated" label interval
    pub label_interval: Duration,
    /// Slot duration assumed before calibration
    pub default_slot_duration_ms: f64,
    /// Weight of a fresh measurement in the smoothed slot duration
    pub smoothing_weight: f64,
    /// Countdown (in slots) at or below which a tier is imminent
    pub imminent_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            sample_interval: SAMPLE_INTERVAL,
            redraw_interval: REDRAW_INTERVAL,
            label_interval: LABEL_INTERVAL,
            default_slot_duration_ms: DEFAULT_SLOT_DURATION_MS,
            smoothing_weight: SMOOTHING_WEIGHT,
            imminent_threshold: IMMINENT_THRESHOLD,
        }
    }
}

impl EstimatorConfig {
    /// Reject values the timers or the calibrator cannot run with
    pub fn validate(&self) -> ExcavateResult<()> {
        for (name, interval) in [
            ("sample_interval", self.sample_interval),
            ("redraw_interval", self.redraw_interval),
            ("label_interval", self.label_interval),
        ] {
            if interval.is_zero() {
                return Err(ExcavateError::Config(format!("{name} must be non-zero")));
            }
        }

        if !(self.default_slot_duration_ms.is_finite() && self.default_slot_duration_ms > 0.0) {
            return Err(ExcavateError::Config(format!(
                "default_slot_duration_ms must be positive, got {}",
                self.default_slot_duration_ms
            )));
        }

        if !(self.smoothing_weight > 0.0 && self.smoothing_weight <= 1.0) {
            return Err(ExcavateError::Config(format!(
                "smoothing_weight must be in (0, 1], got {}",
                self.smoothing_weight
            )));
        }

        if !(self.imminent_threshold.is_finite() && self.imminent_threshold >= 0.0) {
            return Err(ExcavateError::Config(format!(
                "imminent_threshold must be non-negative, got {}",
                self.imminent_threshold
            )));
        }

        Ok(())
    }
}

/// Environment variable for the collection account
pub const COLLECTION_ENV: &str = "EXCAVATE_COLLECTION";
/// Environment variable for the slot-tracking account
pub const SLOT_TRACKER_ENV: &str = "EXCAVATE_SLOT_TRACKER";
/// Environment variable for the signer (authority) account
pub const AUTHORITY_ENV: &str = "EXCAVATE_AUTHORITY";

/// Fixed on-chain accounts passed through to the mint layer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MintAccounts {
    pub collection: Option<Address>,
    pub slot_tracker: Option<Address>,
    pub authority: Option<Address>,
}

impl MintAccounts {
    /// Read whichever accounts are configured in the environment
    pub fn from_env() -> ExcavateResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ExcavateResult<Self> {
        let read = |key: &str| -> ExcavateResult<Option<Address>> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Address::parse(&v).map(Some),
                _ => Ok(None),
            }
        };

        Ok(MintAccounts {
            collection: read(COLLECTION_ENV)?,
            slot_tracker: read(SLOT_TRACKER_ENV)?,
            authority: read(AUTHORITY_ENV)?,
        })
    }
}
