//! PoS Node
//!
//! Main entry point for a single-node proof-of-stake ledger.
//! Deploys genesis, bootstraps validators, runs consensus rounds and serves
//! the read-only status API until interrupted.

use anyhow::Result;
use clap::Parser;
use pos_network::{Network, NetworkEvent};
use rpc_server::{HttpRpcServer, WebSocketServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::NodeConfig;

/// Single-node proof-of-stake ledger
#[derive(Parser, Debug)]
#[command(name = "pos-node")]
#[command(about = "Single-node proof-of-stake ledger with stake-weighted leader selection", long_about = None)]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP bind address (overrides config)
    #[arg(long)]
    http_addr: Option<String>,

    /// WebSocket bind address (overrides config)
    #[arg(long)]
    ws_addr: Option<String>,

    /// Block time in milliseconds (overrides config)
    #[arg(long)]
    block_time_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn node_config(&self) -> Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::load(path)?,
            None => NodeConfig::default(),
        };

        if let Some(addr) = &self.http_addr {
            config.http_addr = addr.clone();
        }
        if let Some(addr) = &self.ws_addr {
            config.ws_addr = addr.clone();
        }
        if let Some(ms) = self.block_time_ms {
            config.network.block_time_seconds = ms as f64 / 1000.0;
        }

        config.network.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.node_config()?;
    run(config).await
}

async fn run(config: NodeConfig) -> Result<()> {
    tracing::info!("Starting PoS node");
    tracing::info!("  Network ID: {}", config.network.network_id);
    tracing::info!("  HTTP: {}", config.http_addr);
    tracing::info!("  WebSocket: {}", config.ws_addr);

    let network = Arc::new(Network::new(config.network.clone())?);

    // Log rounds as they happen
    let mut events = network.subscribe();
    let event_logger = tokio::spawn(async move {
        let mut rounds = 0u64;
        while let Ok(event) = events.recv().await {
            match event {
                NetworkEvent::ConsensusRound(round) => {
                    rounds += 1;
                    // ~every 10 seconds at the default block time
                    if rounds % 100 == 0 {
                        tracing::info!("Round {}: leader {}", round.round, round.validator_id);
                    }
                }
                NetworkEvent::NetworkStarted { network_id } => {
                    tracing::info!("Network {} started", network_id);
                }
                NetworkEvent::NetworkStopped { network_id } => {
                    tracing::info!("Network {} stopped", network_id);
                }
            }
        }
    });

    let status = network.initialize()?;
    tracing::info!(
        "{} validators, total stake {}, {} consensus",
        status.validator_count,
        status.total_stake,
        status.consensus_kind
    );

    // Start HTTP server
    let http_network = network.clone();
    let http_addr = config.http_addr.clone();
    let http_server = tokio::spawn(async move {
        if let Err(e) = HttpRpcServer::new(http_network).run(&http_addr).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    // Start WebSocket server
    let ws_network = network.clone();
    let ws_addr = config.ws_addr.clone();
    let ws_server = tokio::spawn(async move {
        if let Err(e) = WebSocketServer::new(ws_network).run(&ws_addr).await {
            tracing::error!("WebSocket server error: {}", e);
        }
    });

    tracing::info!("Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    network.stop();

    http_server.abort();
    ws_server.abort();
    event_logger.abort();

    tracing::info!(
        "Node stopped after {} rounds",
        network.rounds_completed()
    );

    Ok(())
}
