use super::{GeofenceDefinition, GeofenceShape};
use crate::geo::Coordinate;
use std::fmt;

/// Validation errors for GeofenceDefinition
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingId,
    InvalidCoordinate { lon: f64, lat: f64 },
    InvalidRadius(f64),
    TooFewVertices(usize),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingId => write!(f, "geofence id is required"),
            ValidationError::InvalidCoordinate { lon, lat } => {
                write!(
                    f,
                    "invalid coordinate ({}, {}): lon must be in [-180, 180] and lat in [-90, 90]",
                    lon, lat
                )
            }
            ValidationError::InvalidRadius(r) => {
                write!(f, "circle radius must be a positive number of meters, got {}", r)
            }
            ValidationError::TooFewVertices(n) => {
                write!(f, "polygon needs at least 3 distinct vertices, got {}", n)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates a geofence definition and returns its normalized form.
///
/// Validation rules:
/// - id: non-empty after trimming
/// - coordinates: finite, lon in [-180, 180], lat in [-90, 90]
/// - circle: radius finite and > 0
/// - polygon: at least 3 vertices after normalization
///
/// Normalization:
/// - id and name are trimmed; an empty name falls back to the id
/// - consecutive duplicate vertices are collapsed
/// - an explicit closing vertex equal to the first is dropped
pub fn validate_and_normalize(
    def: GeofenceDefinition,
) -> Result<GeofenceDefinition, ValidationError> {
    let mut def = def;

    def.id = def.id.trim().to_string();
    if def.id.is_empty() {
        return Err(ValidationError::MissingId);
    }

    def.name = def.name.trim().to_string();
    if def.name.is_empty() {
        def.name = def.id.clone();
    }

    def.shape = match def.shape {
        GeofenceShape::Circle {
            center,
            radius_meters,
        } => {
            check_coordinate(&center)?;
            if !radius_meters.is_finite() || radius_meters <= 0.0 {
                return Err(ValidationError::InvalidRadius(radius_meters));
            }
            GeofenceShape::Circle {
                center,
                radius_meters,
            }
        }
        GeofenceShape::Polygon { ring } => GeofenceShape::Polygon {
            ring: normalize_ring(ring)?,
        },
    };

    Ok(def)
}

fn check_coordinate(c: &Coordinate) -> Result<(), ValidationError> {
    if c.is_valid() {
        Ok(())
    } else {
        Err(ValidationError::InvalidCoordinate {
            lon: c.lon,
            lat: c.lat,
        })
    }
}

fn normalize_ring(ring: Vec<Coordinate>) -> Result<Vec<Coordinate>, ValidationError> {
    let mut normalized: Vec<Coordinate> = Vec::with_capacity(ring.len());

    for vertex in ring {
        check_coordinate(&vertex)?;
        if normalized.last() != Some(&vertex) {
            normalized.push(vertex);
        }
    }

    // Ring is implicitly closed
    if normalized.len() > 1 && normalized.first() == normalized.last() {
        normalized.pop();
    }

    if normalized.len() < 3 {
        return Err(ValidationError::TooFewVertices(normalized.len()));
    }

    Ok(normalized)
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_normalize_ring_drops_closing_vertex() {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 0.0),
        ];
        assert_eq!(normalize_ring(ring).unwrap().len(), 3);
    }

    #[test]
    fn test_normalize_ring_collapses_duplicates() {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
        ];
        assert_eq!(normalize_ring(ring).unwrap().len(), 3);
    }

    #[test]
    fn test_closed_triangle_of_two_points_is_rejected() {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 0.0),
        ];
        assert_eq!(
            normalize_ring(ring).unwrap_err(),
            ValidationError::TooFewVertices(2)
        );
    }
}
