//! Excavate Time - Slot clock estimation
//!
//! This crate implements the estimation side of the countdown:
//! - Rate calibration: smoothed real-world time per slot
//! - Interpolation: continuous slot/epoch projection between samples
//! - SlotEstimator: the current/previous sample baseline

pub mod calibrate;
pub mod interpolate;
pub mod estimator;

pub use calibrate::*;
pub use interpolate::*;
pub use estimator::*;
