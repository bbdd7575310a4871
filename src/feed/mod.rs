// Input feeds: geofence management commands and vehicle positions

use crate::engine::DetectionEngine;
use crate::event::GeofenceEvent;
use crate::geofence::{GeofenceDefinition, ValidationError};
use crate::state::VehiclePositionSample;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(test)]
mod tests;

/// Change notification from the geofence management side
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GeofenceCommand {
    /// Create or update a geofence
    Upsert { geofence: GeofenceDefinition },
    Remove { id: String },
    /// Replace the whole set (session start)
    Load { geofences: Vec<GeofenceDefinition> },
    Clear,
}

/// Apply a geofence command to the engine
pub fn apply_geofence_command(
    engine: &DetectionEngine,
    command: GeofenceCommand,
) -> Result<(), ValidationError> {
    match command {
        GeofenceCommand::Upsert { geofence } => engine.upsert_geofence(geofence)?,
        GeofenceCommand::Remove { id } => {
            engine.remove_geofence(&id);
        }
        GeofenceCommand::Load { geofences } => {
            engine.load_geofences(geofences);
        }
        GeofenceCommand::Clear => engine.clear_geofences(),
    }
    Ok(())
}

/// Feed a position sample to the engine.
///
/// In on-sample mode the vehicle is evaluated right away and the detected
/// events are returned; otherwise the sample waits for the next tick.
pub fn apply_position_sample(
    engine: &DetectionEngine,
    sample: VehiclePositionSample,
) -> Vec<GeofenceEvent> {
    if engine.config().evaluate_on_sample {
        engine.process_sample(sample)
    } else {
        engine.ingest_sample(sample);
        Vec::new()
    }
}

pub fn decode_geofence_command(payload: &[u8]) -> Result<GeofenceCommand> {
    serde_json::from_slice(payload).context("Failed to deserialize geofence command")
}

pub fn decode_position_sample(payload: &[u8]) -> Result<VehiclePositionSample> {
    serde_json::from_slice(payload).context("Failed to deserialize position sample")
}

/// Read a JSON array of geofence definitions (bootstrap file)
pub fn load_geofences_file(path: &Path) -> Result<Vec<GeofenceDefinition>> {
    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read geofences file '{}'", path.display()))?;
    let geofences =
        serde_json::from_str(&contents).context("Failed to deserialize geofences file")?;
    Ok(geofences)
}
