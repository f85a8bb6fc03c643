//! Interpolation of the slot counter between samples

use excavate_core::{CalibrationState, InterpolatedState, Sample, WallTime};

/// Project the slot counter to `now`.
///
/// Pure and side-effect free; the fast redraw path calls this on every
/// tick. Returns `None` until a first sample exists. Results are unclamped
/// and may run past the epoch boundary while a sample is overdue.
pub fn project(
    sample: Option<&Sample>,
    calibration: &CalibrationState,
    now: WallTime,
) -> Option<InterpolatedState> {
    let sample = sample?;

    let elapsed_ms = now.millis_since(sample.observed_at()) as f64;
    let slots_elapsed = elapsed_ms / calibration.slot_duration_ms();

    Some(InterpolatedState {
        estimated_slot: sample.slot() as f64 + slots_elapsed,
        estimated_epoch_remaining: sample.epoch_slots_remaining() as f64 - slots_elapsed,
    })
}
