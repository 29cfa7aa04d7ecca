//! Cancellable periodic trigger
//!
//! Runs a callback every `period` on the tokio runtime. The callback executes
//! while holding the ticker's gate; `stop` takes the same gate before closing
//! it, so once `stop` returns no callback is running and none will start.

use crate::error::ConsensusError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub struct Ticker {
    /// `true` while callbacks may fire
    gate: Arc<Mutex<bool>>,
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl Ticker {
    /// Start ticking on the current tokio runtime. The first tick fires one
    /// period after the call.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Result<Self, ConsensusError>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(ConsensusError::InvalidBlockTime(0.0));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConsensusError::NoRuntime)?;

        let gate = Arc::new(Mutex::new(true));
        let task_gate = gate.clone();

        let handle = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let open = task_gate.lock();
                if !*open {
                    break;
                }
                on_tick();
            }
        });

        Ok(Self {
            gate,
            handle: Some(handle),
            period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        *self.gate.lock()
    }

    /// Cancel the trigger. Blocks until any in-flight callback has finished.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        *self.gate.lock() = false;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
