//! Error types for the countdown estimator

use thiserror::Error;

/// Core Excavate errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExcavateError {
    // Remote clock source errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid epoch info: slot index {slot_index} beyond {slots_in_epoch} slots")]
    InvalidEpochInfo { slot_index: u64, slots_in_epoch: u64 },

    // Setup errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // Lifecycle errors
    #[error("Estimator has been shut down")]
    ShutDown,
}

impl ExcavateError {
    /// Whether this error belongs to the user-visible network failure kind.
    ///
    /// Malformed payloads are reported to users the same way as an
    /// unreachable endpoint.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ExcavateError::Network(_)
                | ExcavateError::MalformedResponse(_)
                | ExcavateError::InvalidEpochInfo { .. }
        )
    }
}

/// Result type for Excavate operations
pub type ExcavateResult<T> = Result<T, ExcavateError>;
