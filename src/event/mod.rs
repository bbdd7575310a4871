use crate::geo::Coordinate;
use crate::geofence::GeofenceDefinition;
use crate::rules::EventKind;
use crate::state::VehiclePositionSample;
use serde::{Deserialize, Serialize};
use uuid::Uuid;


/// GeofenceEvent represents one detected geofence transition.
///
/// Events are immutable once created and are time-ordered via UUIDv7
/// identifiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeofenceEvent {
    /// UUIDv7 identifier (time-ordered, globally unique)
    pub event_id: String,

    pub vehicle_id: String,

    pub geofence_id: String,

    /// Geofence name at detection time
    pub geofence_name: String,

    pub event_type: EventKind,

    /// Position that triggered the transition
    pub position: Coordinate,

    /// Unix epoch milliseconds of the triggering sample
    pub timestamp: i64,

    /// Human-readable description for notifications
    pub message: String,
}

impl GeofenceEvent {
    /// Build the event for a transition of `sample` against `geofence`
    pub fn new(
        kind: EventKind,
        sample: &VehiclePositionSample,
        geofence: &GeofenceDefinition,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7().to_string(),
            vehicle_id: sample.vehicle_id.clone(),
            geofence_id: geofence.id.clone(),
            geofence_name: geofence.name.clone(),
            event_type: kind,
            position: sample.position,
            timestamp: sample.timestamp,
            message: describe(kind, &sample.vehicle_id, &geofence.name),
        }
    }

    pub fn is_violation(&self) -> bool {
        self.event_type.is_violation()
    }
}

fn describe(kind: EventKind, vehicle_id: &str, geofence_name: &str) -> String {
    match kind {
        EventKind::Enter => format!("Vehicle {} entered geofence {}", vehicle_id, geofence_name),
        EventKind::Exit => format!("Vehicle {} left geofence {}", vehicle_id, geofence_name),
        EventKind::ViolationEnter => format!(
            "Violation: vehicle {} entered forbidden zone {}",
            vehicle_id, geofence_name
        ),
        EventKind::ViolationExit => format!(
            "Violation: vehicle {} left stay-in zone {}",
            vehicle_id, geofence_name
        ),
    }
}
