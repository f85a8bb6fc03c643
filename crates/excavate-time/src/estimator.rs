//! Slot estimator - owns the sample baseline and the calibration

use excavate_core::{CalibrationState, InterpolatedState, Sample, WallTime};
use tracing::{debug, warn};

use crate::{project, CalibrationOutcome, RateCalibrator};

/// Baseline for interpolation.
///
/// Holds exactly two named sample slots (current/previous); older samples
/// are dropped. Calibration only moves when a new sample arrives.
#[derive(Clone, Debug)]
pub struct SlotEstimator {
    /// Latest successful sample - the interpolation baseline
    current: Option<Sample>,
    /// Sample replaced by `current`
    previous: Option<Sample>,
    /// Smoothed slot duration
    calibration: CalibrationState,
    calibrator: RateCalibrator,
}

impl SlotEstimator {
    /// Create an estimator with the default slot duration
    pub fn new() -> Self {
        Self::with_calibration(CalibrationState::default(), RateCalibrator::new())
    }

    pub fn with_calibration(calibration: CalibrationState, calibrator: RateCalibrator) -> Self {
        SlotEstimator {
            current: None,
            previous: None,
            calibration,
            calibrator,
        }
    }

    /// Rebase on a fresh successful sample.
    ///
    /// Calibration is updated from the (current, new) pair first, then the
    /// new sample becomes the baseline even when calibration skipped it.
    pub fn observe(&mut self, sample: Sample) -> CalibrationOutcome {
        let (next, outcome) = self
            .calibrator
            .calibrate(self.current.as_ref(), &sample, self.calibration);

        match outcome {
            CalibrationOutcome::Applied { measured_ms } => {
                debug!(
                    slot = sample.slot(),
                    measured_ms,
                    slot_duration_ms = next.slot_duration_ms(),
                    "calibrated slot duration"
                );
            }
            CalibrationOutcome::SlotRegressed { slot_delta } => {
                warn!(slot = sample.slot(), slot_delta, "slot counter did not advance, calibration skipped");
            }
            CalibrationOutcome::ClockSkewed { time_delta_ms } => {
                warn!(slot = sample.slot(), time_delta_ms, "wall clock did not advance, calibration skipped");
            }
            CalibrationOutcome::NoPrevious => {}
        }

        self.calibration = next;
        self.previous = self.current.replace(sample);
        outcome
    }

    /// Project slot and epoch position to `now`
    #[inline]
    pub fn project(&self, now: WallTime) -> Option<InterpolatedState> {
        project(self.current.as_ref(), &self.calibration, now)
    }

    pub fn current(&self) -> Option<&Sample> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&Sample> {
        self.previous.as_ref()
    }

    pub fn calibration(&self) -> CalibrationState {
        self.calibration
    }

    pub fn has_baseline(&self) -> bool {
        self.current.is_some()
    }
}

impl Default for SlotEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(slot: u64, remaining: u64, at_ms: i64) -> Sample {
        Sample::new(slot, remaining, WallTime::from_millis(at_ms))
    }

    #[test]
    fn test_first_sample_keeps_default() {
        let mut estimator = SlotEstimator::new();
        assert!(estimator.project(WallTime::ZERO).is_none());

        let outcome = estimator.observe(sample(100, 50, 0));

        assert_eq!(outcome, CalibrationOutcome::NoPrevious);
        assert_eq!(estimator.calibration().slot_duration_ms(), 400.0);
        assert!(estimator.has_baseline());
        assert!(estimator.previous().is_none());
    }

    #[test]
    fn test_two_slot_baseline() {
        let mut estimator = SlotEstimator::new();
        estimator.observe(sample(100, 50, 0));
        estimator.observe(sample(105, 45, 1000));
        estimator.observe(sample(118, 32, 6000));

        assert_eq!(estimator.current().unwrap().slot(), 118);
        assert_eq!(estimator.previous().unwrap().slot(), 105);
    }

    #[test]
    fn test_calibrates_against_consecutive_samples() {
        let mut estimator = SlotEstimator::new();
        estimator.observe(sample(100, 50, 0));
        let outcome = estimator.observe(sample(105, 45, 1000));

        assert!(outcome.is_applied());
        assert!((estimator.calibration().slot_duration_ms() - 340.0).abs() < 1e-9);
    }

    #[test]
    fn test_regression_rebases_without_calibrating() {
        let mut estimator = SlotEstimator::new();
        estimator.observe(sample(200, 50, 0));
        let outcome = estimator.observe(sample(190, 60, 5000));

        assert_eq!(outcome, CalibrationOutcome::SlotRegressed { slot_delta: -10 });
        assert_eq!(estimator.calibration().slot_duration_ms(), 400.0);

        // Freshest reading still becomes the baseline
        let state = estimator.project(WallTime::from_millis(5000)).unwrap();
        assert!((state.estimated_slot - 190.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_uses_updated_calibration() {
        let mut estimator = SlotEstimator::new();
        estimator.observe(sample(100, 50, 0));
        estimator.observe(sample(105, 45, 1000));

        // 340ms per slot after calibration
        let state = estimator.project(WallTime::from_millis(1000 + 680)).unwrap();
        assert!((state.estimated_slot - 107.0).abs() < 1e-9);
        assert!((state.estimated_epoch_remaining - 43.0).abs() < 1e-9);
    }
}
