//! Node Configuration

use anyhow::Context;
use pos_network::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    /// HTTP bind address
    pub http_addr: String,
    /// WebSocket bind address
    pub ws_addr: String,
    /// Ledger network parameters
    pub network: NetworkConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:8899".to_string(),
            ws_addr: "127.0.0.1:8900".to_string(),
            network: NetworkConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load from a JSON file; omitted fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.network.validate()?;
        Ok(config)
    }
}
