//! Consensus Errors

use thiserror::Error;

/// Validator registry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Validator already exists: {0}")]
    AlreadyExists(String),

    #[error("Validator not found: {0}")]
    NotFound(String),

    #[error("Validator {id} listed twice in one batch")]
    DuplicateInBatch { id: String },

    #[error("Commission {commission} for {id} is outside [0, 1]")]
    InvalidCommission { id: String, commission: f64 },
}

/// Scheduler errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    #[error("Consensus scheduler already running")]
    AlreadyRunning,

    #[error("No async runtime available to drive the scheduler")]
    NoRuntime,

    #[error("Block time must be a positive number of seconds, got {0}")]
    InvalidBlockTime(f64),
}
