//! PoS Consensus - stake-weighted leader selection
//!
//! Architecture:
//! - Validators register with a stake; voting power is a snapshot share of total stake
//! - A periodic ticker drives one round per block time
//! - Each round draws a weighted-random leader from the active set and publishes it
//! - Consumers subscribe to the event bus; nothing is replayed

pub mod error;
pub mod events;
pub mod random;
pub mod registry;
pub mod scheduler;
pub mod ticker;
pub mod types;

pub use error::{ConsensusError, RegistryError};
pub use events::EventBus;
pub use random::{FixedRandom, RandomSource, RandomSourceError, SequenceRandom, ThreadRandom};
pub use registry::ValidatorRegistry;
pub use scheduler::{select_leader, ConsensusScheduler};
pub use ticker::Ticker;
pub use types::*;

/// Default interval between rounds, in seconds
pub const DEFAULT_BLOCK_TIME_SECONDS: f64 = 0.1;
