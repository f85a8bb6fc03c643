//! Excavate Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by the countdown estimator:
//! - Wall-clock time (WallTime) and the clock capability
//! - Samples of the remote slot counter
//! - Calibration and interpolated state
//! - Error taxonomy and compiled-in parameters

pub mod time;
pub mod sample;
pub mod params;
pub mod error;

pub use time::*;
pub use sample::*;
pub use params::*;
pub use error::*;
