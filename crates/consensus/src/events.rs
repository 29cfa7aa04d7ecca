//! Event bus for lifecycle and round notifications
//!
//! Backed by a bounded broadcast channel. Each subscriber gets its own
//! receiver; dropping the receiver unsubscribes. Events published with no
//! subscribers are discarded, and late subscribers see no history.

use crate::types::NetworkEvent;
use tokio::sync::broadcast;

/// Default per-subscriber buffer
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<NetworkEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new listener
    pub fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers, returning how many received it
    pub fn publish(&self, event: NetworkEvent) -> usize {
        // Err only means nobody is listening
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
