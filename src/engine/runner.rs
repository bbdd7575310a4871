use crate::engine::DetectionEngine;
use crate::event::GeofenceEvent;
use crate::sink::EventSink;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Run the periodic detection loop until `shutdown` turns true.
///
/// Each tick evaluates every online vehicle against its candidate geofences.
/// The resulting events are dispatched on a spawned task so a slow sink never
/// delays the next tick. Dispatches already in flight when the loop stops are
/// left to complete.
///
/// With `evaluate_on_sample` set, vehicles are evaluated as their samples
/// arrive and the loop only waits for shutdown, so the cooldown gate runs on
/// sample time alone.
pub async fn run_detection_loop(
    engine: Arc<DetectionEngine>,
    sink: Arc<dyn EventSink>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(engine.config().tick_interval());

    // Skip missed ticks to prevent backlog under load
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let tick_evaluation = !engine.config().evaluate_on_sample;

    info!(
        tick_evaluation = tick_evaluation,
        tick_interval_ms = engine.config().tick_interval_ms,
        freshness_window_secs = engine.config().freshness_window_secs,
        cooldown_ms = engine.config().cooldown_ms,
        "Starting detection loop"
    );

    loop {
        tokio::select! {
            _ = ticker.tick(), if tick_evaluation => {
                let now = Utc::now().timestamp_millis();
                let events = engine.evaluate_cycle(now);

                if !events.is_empty() {
                    tokio::spawn(dispatch_events(engine.clone(), sink.clone(), events));
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Detection loop stopped");
}

/// Hand events to the sink one call per event, in order.
///
/// A failed dispatch is logged and counted; it neither blocks nor rolls back
/// the remaining events and is never retried. Returns the number of events
/// delivered.
pub async fn dispatch_events(
    engine: Arc<DetectionEngine>,
    sink: Arc<dyn EventSink>,
    events: Vec<GeofenceEvent>,
) -> usize {
    let mut delivered = 0;

    for event in &events {
        match sink.dispatch(event).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                engine.metrics.record_dispatch_failure();
                warn!(
                    event_id = %event.event_id,
                    vehicle_id = %event.vehicle_id,
                    geofence_id = %event.geofence_id,
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to dispatch geofence event"
                );
            }
        }
    }

    delivered
}
