use super::EventSink;
use crate::event::GeofenceEvent;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

/// In-process fan-out of events to tracking views
#[derive(Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<GeofenceEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to dispatched events
    pub fn subscribe(&self) -> broadcast::Receiver<GeofenceEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl EventSink for BroadcastSink {
    async fn dispatch(&self, event: &GeofenceEvent) -> Result<()> {
        // No subscribers is fine
        if self.tx.send(event.clone()).is_err() {
            debug!(event_id = %event.event_id, "No event subscribers");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::rules::EventKind;

    fn event() -> GeofenceEvent {
        GeofenceEvent {
            event_id: "evt-1".to_string(),
            vehicle_id: "truck-1".to_string(),
            geofence_id: "gf-1".to_string(),
            geofence_name: "Depot".to_string(),
            event_type: EventKind::Enter,
            position: Coordinate::new(106.80, -6.20),
            timestamp: 1_000,
            message: "Vehicle truck-1 entered geofence Depot".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_reaches_subscribers() {
        let sink = BroadcastSink::default();
        let mut rx = sink.subscribe();

        sink.dispatch(&event()).await.unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.event_id, "evt-1");
    }

    #[tokio::test]
    async fn test_dispatch_without_subscribers_succeeds() {
        let sink = BroadcastSink::default();
        assert_eq!(sink.receiver_count(), 0);
        assert!(sink.dispatch(&event()).await.is_ok());
    }
}
