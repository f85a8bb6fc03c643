//! Excavate Runtime - Countdown estimator orchestration
//!
//! Runs three independent timers over one shared baseline:
//! 1. Sampling (5s): fetch, calibrate, rebase
//! 2. Redraw (100ms): interpolate, evaluate tiers, rewrite the board
//! 3. Label (1s): refresh the "last updated" text
//!
//! The presenter side formats countdowns and publishes display snapshots.

pub mod config;
pub mod presenter;
pub mod estimator;
pub mod mint;

pub use config::*;
pub use presenter::*;
pub use estimator::*;
pub use mint::*;
