// Event sinks: where detected geofence events are handed off

mod broadcast;
mod nats;

pub use self::broadcast::BroadcastSink;
pub use self::nats::NatsEventSink;

use crate::event::GeofenceEvent;
use anyhow::Result;
use async_trait::async_trait;

/// Destination for detected events (persistence, notifications).
///
/// Delivery is best-effort: the engine calls `dispatch` once per event and
/// never retries a failed call.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn dispatch(&self, event: &GeofenceEvent) -> Result<()>;
}
