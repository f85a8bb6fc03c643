//! Samples of the remote slot counter and the state derived from them

use crate::{WallTime, DEFAULT_SLOT_DURATION_MS};

/// One reading of the remote clock source.
/// Immutable once taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    slot: u64,
    epoch_slots_remaining: u64,
    observed_at: WallTime,
}

impl Sample {
    pub fn new(slot: u64, epoch_slots_remaining: u64, observed_at: WallTime) -> Self {
        Sample {
            slot,
            epoch_slots_remaining,
            observed_at,
        }
    }

    #[inline]
    pub fn slot(&self) -> u64 {
        self.slot
    }

    #[inline]
    pub fn epoch_slots_remaining(&self) -> u64 {
        self.epoch_slots_remaining
    }

    #[inline]
    pub fn observed_at(&self) -> WallTime {
        self.observed_at
    }

    /// Signed slot delta from `earlier` to `self`
    #[inline]
    pub fn slots_since(&self, earlier: &Sample) -> i64 {
        self.slot as i64 - earlier.slot as i64
    }

    /// Signed millisecond delta from `earlier` to `self`
    #[inline]
    pub fn millis_since(&self, earlier: &Sample) -> i64 {
        self.observed_at.millis_since(earlier.observed_at)
    }
}

/// Running estimate of real-world time per slot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationState {
    slot_duration_ms: f64,
}

impl CalibrationState {
    /// Create a calibration with an explicit slot duration.
    /// Non-finite or non-positive durations fall back to the default.
    pub fn new(slot_duration_ms: f64) -> Self {
        if slot_duration_ms.is_finite() && slot_duration_ms > 0.0 {
            CalibrationState { slot_duration_ms }
        } else {
            CalibrationState::default()
        }
    }

    #[inline]
    pub fn slot_duration_ms(&self) -> f64 {
        self.slot_duration_ms
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        CalibrationState {
            slot_duration_ms: DEFAULT_SLOT_DURATION_MS,
        }
    }
}

/// Continuous projection of the slot counter at some instant.
/// Both fields are unclamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolatedState {
    pub estimated_slot: f64,
    pub estimated_epoch_remaining: f64,
}
