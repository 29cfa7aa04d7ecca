//! Consensus scheduler - one leader selection per block time
//!
//! State machine: Stopped -> Running -> Stopped. While running, each tick:
//! 1. Snapshot the active set (under the registry read lock)
//! 2. Draw `r` in `[0, total voting power)` from the random source
//! 3. Walk the set in registration order subtracting voting power; the first
//!    validator that takes `r` to `<= 0` leads, else the first validator does
//! 4. Publish a `ConsensusRound` event
//!
//! Rounds never append blocks.

use crate::error::ConsensusError;
use crate::events::EventBus;
use crate::random::{validate_unit, RandomSource};
use crate::registry::ValidatorRegistry;
use crate::ticker::Ticker;
use crate::types::{ConsensusRound, NetworkEvent, Validator};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pick the validator at which a running remainder of `target` reaches `<= 0`.
///
/// Falls back to the first validator when rounding leaves the remainder
/// positive (or `target` is not a number). Returns `None` only for an empty set.
pub fn select_leader<'a>(active: &[&'a Validator], target: f64) -> Option<&'a Validator> {
    let mut remainder = target;
    for &validator in active {
        remainder -= validator.voting_power;
        if remainder <= 0.0 {
            return Some(validator);
        }
    }
    active.first().copied()
}

/// Shared between the scheduler handle and the ticker callback
struct RoundDriver {
    registry: Arc<ValidatorRegistry>,
    events: EventBus,
    random: Arc<dyn RandomSource>,
    rounds: AtomicU64,
}

impl RoundDriver {
    fn run_round(&self) -> Option<ConsensusRound> {
        // Snapshot + select happen under one registry read lock.
        let leader = self.registry.with_active(|active| {
            if active.is_empty() {
                tracing::trace!("No active validators, skipping round");
                return None;
            }

            let total: f64 = active.iter().map(|v| v.voting_power).sum();
            let sample = match self.random.next_unit().and_then(validate_unit) {
                Ok(sample) => sample,
                Err(e) => {
                    tracing::warn!("Skipping consensus round: {}", e);
                    return None;
                }
            };

            select_leader(&active, sample * total).map(|v| v.id.clone())
        })?;

        let round = ConsensusRound {
            round: self.rounds.fetch_add(1, Ordering::SeqCst) + 1,
            validator_id: leader,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };

        tracing::debug!("Round {}: leader {}", round.round, round.validator_id);
        self.events.publish(NetworkEvent::ConsensusRound(round.clone()));
        Some(round)
    }
}

/// Drives consensus rounds at a fixed interval
pub struct ConsensusScheduler {
    driver: Arc<RoundDriver>,
    block_time: Duration,
    ticker: Mutex<Option<Ticker>>,
}

impl ConsensusScheduler {
    pub fn new(
        registry: Arc<ValidatorRegistry>,
        events: EventBus,
        random: Arc<dyn RandomSource>,
        block_time_seconds: f64,
    ) -> Result<Self, ConsensusError> {
        if !block_time_seconds.is_finite() || block_time_seconds <= 0.0 {
            return Err(ConsensusError::InvalidBlockTime(block_time_seconds));
        }

        Ok(Self {
            driver: Arc::new(RoundDriver {
                registry,
                events,
                random,
                rounds: AtomicU64::new(0),
            }),
            block_time: Duration::from_secs_f64(block_time_seconds),
            ticker: Mutex::new(None),
        })
    }

    /// Begin periodic rounds on the current tokio runtime
    pub fn start(&self) -> Result<(), ConsensusError> {
        let mut ticker = self.ticker.lock();
        if ticker.is_some() {
            return Err(ConsensusError::AlreadyRunning);
        }

        let driver = self.driver.clone();
        *ticker = Some(Ticker::spawn(self.block_time, move || {
            driver.run_round();
        })?);

        tracing::info!(
            "Consensus scheduler started ({}ms rounds)",
            self.block_time.as_millis()
        );
        Ok(())
    }

    /// Cancel the trigger. Returns `false` if it was not running.
    ///
    /// No round fires after this returns.
    pub fn stop(&self) -> bool {
        match self.ticker.lock().take() {
            Some(ticker) => {
                ticker.stop();
                tracing::info!(
                    "Consensus scheduler stopped after {} rounds",
                    self.rounds_completed()
                );
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.lock().is_some()
    }

    /// Execute a single round immediately, independent of the trigger
    pub fn run_round(&self) -> Option<ConsensusRound> {
        self.driver.run_round()
    }

    pub fn rounds_completed(&self) -> u64 {
        self.driver.rounds.load(Ordering::SeqCst)
    }

    pub fn block_time(&self) -> Duration {
        self.block_time
    }
}

impl Drop for ConsensusScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
