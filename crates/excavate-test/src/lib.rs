//! Excavate Test Harness - Fakes and simulation for the estimator
//!
//! This crate provides:
//! - Hand-driven and tokio-driven wall clocks
//! - Scripted clock sources (fixed readings, failures, delays)
//! - A simulated chain with a drifting slot rate and network jitter
//! - End-to-end scenarios across sampler, calibrator, tiers and presenter

pub mod clock;
pub mod source;
pub mod chain_simulator;

#[cfg(test)]
mod scenarios;

pub use clock::*;
pub use source::*;
pub use chain_simulator::*;
