//! Event bus

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::CoordEvent;

/// Broadcast bus for coordination events
///
/// Components emit events here; callers subscribe to observe asynchronous
/// completion (deliveries, activations, resolutions) without polling.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<CoordEvent>>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Emit an event to all subscribers
    ///
    /// Events are dropped when nobody is subscribed.
    pub fn emit(&self, event: CoordEvent) {
        tracing::trace!("Coordination event for {}", event.entity_id());
        let _ = self.sender.send(event);
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<CoordEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new(16);
        let mut sub = bus.subscribe();

        bus.emit(CoordEvent::agent_registered("infra"));

        let received = sub.recv().await.unwrap();
        assert_eq!(received.entity_id(), "infra");
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(CoordEvent::knowledge_shared("k-1", "infra", "optimization"));

        assert_eq!(sub1.recv().await.unwrap().entity_id(), "k-1");
        assert_eq!(sub2.recv().await.unwrap().entity_id(), "k-1");
    }

    #[test]
    fn test_no_subscribers_no_error() {
        let bus = EventBus::new(16);
        bus.emit(CoordEvent::agent_registered("infra"));
        bus.emit(CoordEvent::agent_deregistered("infra"));
    }
}
