use tokio::sync::broadcast;

use jobdash_logging::dash_debug;

/// Cross-component notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Saved/applied counts changed on the server.
    StatsChanged,
}

/// Publish/subscribe bus shared by the engine and the shell.
///
/// Any holder may publish; each subscriber sees every event sent after it
/// subscribed. Slow subscribers lose the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: BusEvent) {
        // No subscribers is not an error.
        if self.tx.send(event).is_err() {
            dash_debug!("Bus event {:?} had no subscribers", event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
