use crate::geo::{self, Coordinate};
use serde::{Deserialize, Serialize};

mod registry;
mod validation;

pub use registry::GeofenceRegistry;
pub use validation::{validate_and_normalize, ValidationError};

/// Access rule attached to a geofence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// Informational: report entries and exits
    Standard,
    /// Alert when a vehicle enters
    Forbidden,
    /// Alert when a vehicle leaves
    StayIn,
    /// Any rule name this engine does not know; never alerts
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceStatus {
    #[default]
    Active,
    Inactive,
}

/// Boundary of a geofence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeofenceShape {
    Circle {
        center: Coordinate,
        radius_meters: f64,
    },
    /// Ring is implicitly closed; the last vertex connects to the first
    Polygon { ring: Vec<Coordinate> },
}

impl GeofenceShape {
    /// Containment test for this shape.
    ///
    /// Circles use the exact great-circle distance. Returns `None` when the
    /// answer cannot be computed (non-finite distance or a degenerate ring),
    /// which only happens for shapes that bypassed registry validation.
    pub fn contains(&self, point: Coordinate) -> Option<bool> {
        match self {
            GeofenceShape::Circle {
                center,
                radius_meters,
            } => {
                let distance = geo::distance_meters(point, *center);
                if !distance.is_finite() || !radius_meters.is_finite() {
                    return None;
                }
                Some(distance <= *radius_meters)
            }
            GeofenceShape::Polygon { ring } => {
                if ring.len() < 3 || !point.is_valid() {
                    return None;
                }
                Some(geo::is_inside_polygon(point, ring))
            }
        }
    }
}

/// A user-defined geographic boundary with an access rule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeofenceDefinition {
    /// Unique identifier assigned by the geofence store
    pub id: String,

    /// Display name, used in event messages
    #[serde(default)]
    pub name: String,

    pub rule_type: RuleType,

    #[serde(default)]
    pub status: GeofenceStatus,

    pub shape: GeofenceShape,

    /// Vehicles this geofence applies to when the engine runs in assigned mode
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_vehicles: Vec<String>,
}

impl GeofenceDefinition {
    pub fn is_active(&self) -> bool {
        self.status == GeofenceStatus::Active
    }

    /// True if this geofence applies to `vehicle_id` in assigned mode
    pub fn is_assigned_to(&self, vehicle_id: &str) -> bool {
        self.assigned_vehicles.iter().any(|v| v == vehicle_id)
    }
}
