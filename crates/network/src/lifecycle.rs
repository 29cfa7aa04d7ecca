//! Network lifecycle
//!
//! `Network` is the context object for one independent ledger instance. It
//! owns the chain, the validator registry, the scheduler and the event bus;
//! several can coexist in one process.

use crate::config::NetworkConfig;
use crate::error::NetworkError;
use parking_lot::{Mutex, RwLock};
use pos_consensus::{
    ConsensusScheduler, EventBus, NetworkEvent, RandomSource, ThreadRandom, ValidatorRegistry,
};
use pos_ledger::{Block, Hash, Ledger, PayloadSigner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Consensus mechanism advertised in status snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusKind {
    #[serde(rename = "proof-of-stake")]
    ProofOfStake,
}

impl fmt::Display for ConsensusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusKind::ProofOfStake => f.write_str("proof-of-stake"),
        }
    }
}

/// Read-only snapshot for dashboards and pollers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub network_id: String,
    pub is_running: bool,
    pub validator_count: usize,
    pub consensus_kind: ConsensusKind,
    pub block_time_seconds: f64,
    /// Stake of all registered validators, active or not
    pub total_stake: u64,
    pub block_height: u64,
    pub genesis_hash: Option<Hash>,
}

pub struct Network {
    config: NetworkConfig,
    signer: PayloadSigner,
    registry: Arc<ValidatorRegistry>,
    scheduler: ConsensusScheduler,
    events: EventBus,
    /// `None` until genesis is deployed
    ledger: RwLock<Option<Ledger>>,
    running: AtomicBool,
    /// Serializes initialize / stop / resume
    transitions: Mutex<()>,
}

impl Network {
    /// Create a network that draws leaders from the thread-local RNG
    pub fn new(config: NetworkConfig) -> Result<Self, NetworkError> {
        Self::with_random_source(config, Arc::new(ThreadRandom))
    }

    pub fn with_random_source(
        config: NetworkConfig,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, NetworkError> {
        config.validate()?;

        let registry = Arc::new(ValidatorRegistry::new());
        let events = EventBus::new();
        let scheduler = ConsensusScheduler::new(
            registry.clone(),
            events.clone(),
            random,
            config.block_time_seconds,
        )?;

        Ok(Self {
            signer: PayloadSigner::new(&config.signing_secret),
            config,
            registry,
            scheduler,
            events,
            ledger: RwLock::new(None),
            running: AtomicBool::new(false),
            transitions: Mutex::new(()),
        })
    }

    /// Deploy genesis, bootstrap validators and start consensus.
    ///
    /// One-shot: once genesis exists this fails with `AlreadyInitialized`,
    /// running or not. Use `resume` to restart a stopped network.
    pub fn initialize(&self) -> Result<NetworkStatus, NetworkError> {
        let _guard = self.transitions.lock();

        if self.running.load(Ordering::SeqCst) || self.ledger.read().is_some() {
            tracing::warn!("Network {} already initialized", self.config.network_id);
            return Err(NetworkError::AlreadyInitialized);
        }
        // The scheduler needs a runtime; check before touching any state.
        tokio::runtime::Handle::try_current()
            .map_err(|_| NetworkError::Consensus(pos_consensus::ConsensusError::NoRuntime))?;

        tracing::info!("Initializing network {}", self.config.network_id);
        tracing::info!("  Block time: {}s", self.config.block_time_seconds);
        tracing::info!("  Consensus: {}", ConsensusKind::ProofOfStake);

        let genesis = self.deploy_genesis();

        let validators = self.registry.register_batch(&self.config.validators)?;
        tracing::info!("Validators initialized: {}", validators.len());

        *self.ledger.write() = Some(Ledger::new(genesis));

        self.scheduler.start()?;
        self.running.store(true, Ordering::SeqCst);

        self.events.publish(NetworkEvent::NetworkStarted {
            network_id: self.config.network_id.clone(),
        });
        tracing::info!("Network {} operational", self.config.network_id);

        Ok(self.status())
    }

    fn deploy_genesis(&self) -> Block {
        let genesis = Block::genesis(
            chrono::Utc::now().timestamp_millis(),
            self.config.genesis_validator.clone(),
            self.config.genesis_difficulty,
            &self.signer,
        );
        tracing::info!("Genesis block deployed: {}...", genesis.hash.short(16));
        genesis
    }

    /// Stop consensus. Returns `false` if the network was not running.
    pub fn stop(&self) -> bool {
        let _guard = self.transitions.lock();

        if !self.running.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.scheduler.stop();
        self.events.publish(NetworkEvent::NetworkStopped {
            network_id: self.config.network_id.clone(),
        });
        tracing::info!("Network {} stopped", self.config.network_id);
        true
    }

    /// Restart consensus on an initialized, stopped network. No-op if running.
    pub fn resume(&self) -> Result<NetworkStatus, NetworkError> {
        let _guard = self.transitions.lock();

        if self.ledger.read().is_none() {
            return Err(NetworkError::NotInitialized);
        }
        if !self.running.load(Ordering::SeqCst) {
            self.scheduler.start()?;
            self.running.store(true, Ordering::SeqCst);
            tracing::info!("Network {} resumed", self.config.network_id);
        }
        Ok(self.status())
    }

    /// Snapshot of the network; no side effects
    pub fn status(&self) -> NetworkStatus {
        let ledger = self.ledger.read();
        NetworkStatus {
            network_id: self.config.network_id.clone(),
            is_running: self.running.load(Ordering::SeqCst),
            validator_count: self.registry.len(),
            consensus_kind: ConsensusKind::ProofOfStake,
            block_time_seconds: self.config.block_time_seconds,
            total_stake: self.registry.total_stake(false),
            block_height: ledger.as_ref().map_or(0, Ledger::height),
            genesis_hash: ledger.as_ref().map(|l| l.genesis().hash),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Listen for lifecycle and round events. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.events.subscribe()
    }

    pub fn genesis_block(&self) -> Option<Block> {
        self.ledger.read().as_ref().map(|l| l.genesis().clone())
    }

    /// Copy of the chain, if initialized
    pub fn ledger(&self) -> Option<Ledger> {
        self.ledger.read().clone()
    }

    pub fn registry(&self) -> &Arc<ValidatorRegistry> {
        &self.registry
    }

    /// Rounds published since the network was created, across restarts
    pub fn rounds_completed(&self) -> u64 {
        self.scheduler.rounds_completed()
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}
