//! Network Errors

use pos_consensus::{ConsensusError, RegistryError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Network already initialized")]
    AlreadyInitialized,

    #[error("Network not initialized")]
    NotInitialized,

    #[error("Invalid network config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),
}
