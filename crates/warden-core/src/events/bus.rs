//! In-process broadcast bus for auth events.

use tokio::sync::broadcast;
use tracing::trace;

use super::{AuthEvent, DomainEvent};

/// Fan-out of [`DomainEvent`]s to any number of subscribers.
///
/// Publishing never fails: with no subscribers the event is dropped, and
/// slow subscribers observe `Lagged` on their own receiver.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event.
    pub fn publish(&self, payload: AuthEvent) {
        trace!(event = payload.name(), "Publishing auth event");
        let _ = self.tx.send(DomainEvent::new(payload));
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
