//! Ledger Errors

use thiserror::Error;

/// Errors raised while decoding hashes or extending the chain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid hash encoding: {0}")]
    InvalidHash(String),

    #[error("Block index mismatch: expected {expected}, got {actual}")]
    IndexMismatch { expected: u64, actual: u64 },

    #[error("Previous hash of block {index} does not match the chain tip")]
    PreviousHashMismatch { index: u64 },

    #[error("Stored hash of block {index} does not match its header")]
    HashMismatch { index: u64 },
}
