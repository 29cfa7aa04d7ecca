//! PoS Network - single-node lifecycle
//!
//! Ties the ledger and consensus crates together:
//! - Seal and store the genesis block
//! - Bootstrap the configured validator set
//! - Start the consensus scheduler and publish lifecycle events
//! - Serve read-only status snapshots

pub mod config;
pub mod error;
pub mod lifecycle;


pub use config::NetworkConfig;
pub use error::NetworkError;
pub use lifecycle::{ConsensusKind, Network, NetworkStatus};

// Re-export types that consumers might need
pub use pos_consensus::{NetworkEvent, RandomSource, Validator, ValidatorSpec};
pub use pos_ledger::{Block, Hash};
