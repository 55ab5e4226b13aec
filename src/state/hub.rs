use tokio::sync::broadcast;

use super::fact::Fact;

/// Fan-out point for committed facts.
///
/// Every WebSocket connection and SSE stream holds its own receiver; a
/// receiver that falls more than the channel capacity behind skips the oldest
/// facts instead of slowing the others down.
pub struct FactHub {
    sender: broadcast::Sender<Fact>,
}

impl FactHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent facts.
    pub fn subscribe(&self) -> broadcast::Receiver<Fact> {
        self.sender.subscribe()
    }

    /// Send a fact to all current subscribers, returning how many were reached.
    pub fn publish(&self, fact: Fact) -> usize {
        self.sender.send(fact).unwrap_or(0)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
