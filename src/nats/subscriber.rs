use crate::engine::{dispatch_events, DetectionEngine};
use crate::feed::{
    apply_geofence_command, apply_position_sample, decode_geofence_command,
    decode_position_sample,
};
use crate::nats::NatsConfig;
use crate::sink::EventSink;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{info, warn};

/// Consume geofence commands and position samples from NATS.
///
/// Malformed messages are logged and skipped. Events detected on arrival (in
/// on-sample mode) are dispatched on a spawned task. Returns when both
/// subscriptions end.
pub async fn run_feed_subscriber(
    engine: Arc<DetectionEngine>,
    sink: Arc<dyn EventSink>,
    client: async_nats::Client,
    config: NatsConfig,
) -> Result<()> {
    let mut geofences = client
        .subscribe(config.geofence_subject.clone())
        .await
        .context("Failed to subscribe to geofence subject")?;
    let mut positions = client
        .subscribe(config.position_subject.clone())
        .await
        .context("Failed to subscribe to position subject")?;

    info!(
        geofence_subject = %config.geofence_subject,
        position_subject = %config.position_subject,
        "Feed subscriber started"
    );

    let mut geofences_open = true;
    let mut positions_open = true;

    while geofences_open || positions_open {
        tokio::select! {
            msg = geofences.next(), if geofences_open => match msg {
                Some(msg) => match decode_geofence_command(&msg.payload) {
                    Ok(command) => {
                        if let Err(e) = apply_geofence_command(&engine, command) {
                            warn!(error = %e, "Geofence command rejected");
                        }
                    }
                    Err(e) => warn!(error = %e, subject = %msg.subject, "Skipping malformed geofence command"),
                },
                None => geofences_open = false,
            },
            msg = positions.next(), if positions_open => match msg {
                Some(msg) => match decode_position_sample(&msg.payload) {
                    Ok(sample) => {
                        let events = apply_position_sample(&engine, sample);
                        if !events.is_empty() {
                            tokio::spawn(dispatch_events(engine.clone(), sink.clone(), events));
                        }
                    }
                    Err(e) => warn!(error = %e, subject = %msg.subject, "Skipping malformed position sample"),
                },
                None => positions_open = false,
            },
        }
    }

    warn!("Feed subscriptions ended");
    Ok(())
}
