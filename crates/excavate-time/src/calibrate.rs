//! Rate calibration from consecutive samples

use excavate_core::{CalibrationState, Sample, SMOOTHING_WEIGHT};

/// What a pair of samples told the calibrator
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CalibrationOutcome {
    /// First sample, nothing to compare against
    NoPrevious,
    /// Slot counter stalled or went backwards (stale or out-of-order read)
    SlotRegressed { slot_delta: i64 },
    /// Wall clock did not move forward between samples
    ClockSkewed { time_delta_ms: i64 },
    /// Estimate updated from a measured slot duration
    Applied { measured_ms: f64 },
}

impl CalibrationOutcome {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, CalibrationOutcome::Applied { .. })
    }
}

/// Single-pole exponential smoother over measured slot durations
#[derive(Clone, Copy, Debug)]
pub struct RateCalibrator {
    /// Weight of a fresh measurement (0.0 - 1.0)
    weight: f64,
}

impl RateCalibrator {
    pub fn new() -> Self {
        Self::with_weight(SMOOTHING_WEIGHT)
    }

    /// Weight is clamped to (0.0, 1.0]
    pub fn with_weight(weight: f64) -> Self {
        let weight = if weight.is_finite() {
            weight.clamp(f64::EPSILON, 1.0)
        } else {
            SMOOTHING_WEIGHT
        };
        RateCalibrator { weight }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Classify a sample pair without touching any state
    pub fn assess(&self, previous: Option<&Sample>, current: &Sample) -> CalibrationOutcome {
        let Some(previous) = previous else {
            return CalibrationOutcome::NoPrevious;
        };

        let time_delta_ms = current.millis_since(previous);
        let slot_delta = current.slots_since(previous);

        if slot_delta <= 0 {
            return CalibrationOutcome::SlotRegressed { slot_delta };
        }
        if time_delta_ms <= 0 {
            return CalibrationOutcome::ClockSkewed { time_delta_ms };
        }

        CalibrationOutcome::Applied {
            measured_ms: time_delta_ms as f64 / slot_delta as f64,
        }
    }

    /// Fold a sample pair into the calibration.
    /// Returns the new state and what happened.
    pub fn calibrate(
        &self,
        previous: Option<&Sample>,
        current: &Sample,
        state: CalibrationState,
    ) -> (CalibrationState, CalibrationOutcome) {
        let outcome = self.assess(previous, current);
        let next = match outcome {
            CalibrationOutcome::Applied { measured_ms } => CalibrationState::new(
                state.slot_duration_ms() * (1.0 - self.weight) + measured_ms * self.weight,
            ),
            _ => state,
        };
        (next, outcome)
    }
}

impl Default for RateCalibrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Calibrate with the default smoothing weight
pub fn calibrate(
    previous: Option<&Sample>,
    current: &Sample,
    state: CalibrationState,
) -> CalibrationState {
    RateCalibrator::new().calibrate(previous, current, state).0
}
