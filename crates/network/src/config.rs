//! Network Configuration

use crate::error::NetworkError;
use pos_consensus::{ValidatorSpec, DEFAULT_BLOCK_TIME_SECONDS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    pub network_id: String,
    /// Seconds between consensus rounds
    pub block_time_seconds: f64,
    /// Shared secret for block authentication tags
    pub signing_secret: String,
    /// Validator id recorded on the genesis block
    pub genesis_validator: String,
    pub genesis_difficulty: u32,
    /// Bootstrapped together at initialize
    pub validators: Vec<ValidatorSpec>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_id: "cec18ed21308cf0fe15cad4b9e04b0fd275dcd08".to_string(),
            block_time_seconds: DEFAULT_BLOCK_TIME_SECONDS,
            signing_secret: "GRUDGE_PRIVATE_KEY".to_string(),
            genesis_validator: "GRUDGE_GENESIS".to_string(),
            genesis_difficulty: 1,
            validators: vec![
                ValidatorSpec::new("grd17-validator", 1_000_000, 0.05),
                ValidatorSpec::new("grd27-validator", 800_000, 0.03),
                ValidatorSpec::new("ale-validator", 600_000, 0.04),
                ValidatorSpec::new("dangrd-validator", 500_000, 0.06),
            ],
        }
    }
}

impl NetworkConfig {
    /// Parse from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| NetworkError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.network_id.is_empty() {
            return Err(NetworkError::InvalidConfig("networkId is empty".to_string()));
        }
        if !self.block_time_seconds.is_finite() || self.block_time_seconds <= 0.0 {
            return Err(NetworkError::InvalidConfig(format!(
                "blockTimeSeconds must be positive, got {}",
                self.block_time_seconds
            )));
        }

        let mut ids = HashSet::new();
        for spec in &self.validators {
            if !ids.insert(spec.id.as_str()) {
                return Err(NetworkError::InvalidConfig(format!(
                    "validator {} listed twice",
                    spec.id
                )));
            }
            if !(0.0..=1.0).contains(&spec.commission) {
                return Err(NetworkError::InvalidConfig(format!(
                    "validator {} commission {} outside [0, 1]",
                    spec.id, spec.commission
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_network() {
        let config = NetworkConfig::default();
        config.validate().unwrap();
        assert_eq!(config.block_time_seconds, 0.1);
        assert_eq!(config.validators.len(), 4);
        let stakes: Vec<u64> = config.validators.iter().map(|v| v.stake).collect();
        assert_eq!(stakes, vec![1_000_000, 800_000, 600_000, 500_000]);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = NetworkConfig::from_json(
            r#"{"networkId": "devnet", "blockTimeSeconds": 0.5,
                "validators": [{"id": "solo", "stake": 10, "commission": 0.1}]}"#,
        )
        .unwrap();
        assert_eq!(config.network_id, "devnet");
        assert_eq!(config.block_time_seconds, 0.5);
        assert_eq!(config.validators.len(), 1);
        assert_eq!(config.genesis_validator, "GRUDGE_GENESIS");
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(NetworkConfig::from_json(r#"{"blockTimeSeconds": 0}"#).is_err());
        assert!(NetworkConfig::from_json(r#"{"networkId": ""}"#).is_err());
        assert!(NetworkConfig::from_json(
            r#"{"validators": [{"id": "a", "stake": 1, "commission": 0.1},
                               {"id": "a", "stake": 2, "commission": 0.1}]}"#
        )
        .is_err());
        assert!(NetworkConfig::from_json(
            r#"{"validators": [{"id": "a", "stake": 1, "commission": 2.0}]}"#
        )
        .is_err());
        assert!(NetworkConfig::from_json("not json").is_err());
    }
}
