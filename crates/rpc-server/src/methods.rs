//! RPC Methods - read-only query handlers
//!
//! Every handler is a pure read of the network; none has side effects.

use pos_network::{Block, Network, NetworkStatus, Validator};
use serde::Serialize;

/// Status snapshot
pub fn handle_get_status(network: &Network) -> NetworkStatus {
    network.status()
}

/// Validator listing, with voting-power totals
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorsResponse {
    pub validators: Vec<Validator>,
    pub active_count: usize,
    pub total_stake: u64,
    pub active_stake: u64,
    /// Sum over active validators; may differ from 1
    pub active_voting_power: f64,
}

pub fn handle_get_validators(network: &Network) -> ValidatorsResponse {
    let registry = network.registry();
    ValidatorsResponse {
        validators: registry.list_all(),
        active_count: registry.active_count(),
        total_stake: registry.total_stake(false),
        active_stake: registry.total_stake(true),
        active_voting_power: registry.total_voting_power(true),
    }
}

pub fn handle_get_genesis(network: &Network) -> Result<Block, RpcError> {
    network.genesis_block().ok_or(RpcError::NotInitialized)
}

pub fn handle_get_health(network: &Network) -> &'static str {
    if network.is_running() {
        "ok"
    } else {
        "stopped"
    }
}

// ============ Error Types ============

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Network not initialized")]
    NotInitialized,
    #[error("Internal error: {0}")]
    InternalError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pos_network::NetworkConfig;

    #[test]
    fn test_queries_before_initialize() {
        let network = Network::new(NetworkConfig::default()).unwrap();

        assert!(!handle_get_status(&network).is_running);
        assert_eq!(handle_get_health(&network), "stopped");
        assert!(matches!(handle_get_genesis(&network), Err(RpcError::NotInitialized)));
        assert!(handle_get_validators(&network).validators.is_empty());
    }

    #[tokio::test]
    async fn test_queries_after_initialize() {
        let network = Network::new(NetworkConfig::default()).unwrap();
        network.initialize().unwrap();

        assert_eq!(handle_get_health(&network), "ok");
        assert_eq!(handle_get_genesis(&network).unwrap().index, 0);

        network.registry().deactivate("dangrd-validator").unwrap();
        let validators = handle_get_validators(&network);
        assert_eq!(validators.validators.len(), 4);
        assert_eq!(validators.active_count, 3);
        assert_eq!(validators.total_stake, 2_900_000);
        assert_eq!(validators.active_stake, 2_400_000);
        assert!(validators.active_voting_power < 1.0);

        network.stop();
    }
}
