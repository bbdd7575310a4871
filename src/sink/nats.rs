use super::EventSink;
use crate::event::GeofenceEvent;
use anyhow::{Context, Result};
use async_nats::jetstream;
use async_trait::async_trait;
use tracing::debug;

/// Subject prefix for published geofence events
pub const EVENT_SUBJECT_PREFIX: &str = "fencewatch.events";

/// Event sink publishing to NATS JetStream
#[derive(Clone)]
pub struct NatsEventSink {
    jetstream: jetstream::Context,
}

impl NatsEventSink {
    pub fn new(jetstream: jetstream::Context) -> Self {
        Self { jetstream }
    }

    /// Subject format: fencewatch.events.{event_type}
    pub fn subject_for(event: &GeofenceEvent) -> String {
        format!("{}.{}", EVENT_SUBJECT_PREFIX, event.event_type)
    }
}

#[async_trait]
impl EventSink for NatsEventSink {
    /// Publish a single event and wait for the JetStream ack
    async fn dispatch(&self, event: &GeofenceEvent) -> Result<()> {
        let subject = Self::subject_for(event);
        let payload = serde_json::to_vec(event).context("Failed to serialize event to JSON")?;

        debug!(
            event_id = %event.event_id,
            vehicle_id = %event.vehicle_id,
            subject = %subject,
            "Publishing geofence event to NATS"
        );

        self.jetstream
            .publish(subject.clone(), payload.into())
            .await
            .context(format!("Failed to publish event to subject '{}'", subject))?
            .await
            .context("Failed to await publish ack")?;

        Ok(())
    }
}
