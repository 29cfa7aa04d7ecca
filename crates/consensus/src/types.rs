//! Core types for validators, rounds and lifecycle events

use serde::{Deserialize, Serialize};

/// A registered validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub id: String,
    pub stake: u64,
    /// Fraction in [0, 1]
    pub commission: f64,
    pub active: bool,
    pub performance: f64,
    /// Share of total stake at the moment of registration; never renormalized
    pub voting_power: f64,
}

/// Registration parameters for one validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorSpec {
    pub id: String,
    pub stake: u64,
    pub commission: f64,
}

impl ValidatorSpec {
    pub fn new(id: impl Into<String>, stake: u64, commission: f64) -> Self {
        Self {
            id: id.into(),
            stake,
            commission,
        }
    }
}

/// Outcome of one scheduler tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusRound {
    /// Monotonic round counter, starting at 1
    pub round: u64,
    pub validator_id: String,
    /// Unix millis
    pub timestamp: i64,
}

/// Events published to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum NetworkEvent {
    /// Emitted once after a successful initialize
    #[serde(rename_all = "camelCase")]
    NetworkStarted { network_id: String },

    /// Emitted per tick with at least one active validator
    ConsensusRound(ConsensusRound),

    /// Emitted when the network is stopped
    #[serde(rename_all = "camelCase")]
    NetworkStopped { network_id: String },
}
