use super::{validate_and_normalize, GeofenceDefinition, ValidationError};
use dashmap::DashMap;
use tracing::{debug, info};

/// In-memory store of validated geofence definitions keyed by id.
///
/// Only definitions that passed validation are ever stored, so everything the
/// detection cycle reads from here is evaluable.
pub struct GeofenceRegistry {
    geofences: DashMap<String, GeofenceDefinition>,
}

impl GeofenceRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self {
            geofences: DashMap::new(),
        }
    }

    /// Validate and store a definition, replacing any entry with the same id.
    ///
    /// Returns the replaced definition. Invalid definitions leave the
    /// registry untouched.
    pub fn upsert(
        &self,
        def: GeofenceDefinition,
    ) -> Result<Option<GeofenceDefinition>, ValidationError> {
        let def = validate_and_normalize(def)?;
        let id = def.id.clone();

        let previous = self.geofences.insert(id.clone(), def);
        debug!(
            geofence_id = %id,
            replaced = previous.is_some(),
            "Geofence stored"
        );

        Ok(previous)
    }

    pub fn remove(&self, id: &str) -> Option<GeofenceDefinition> {
        let removed = self.geofences.remove(id).map(|(_, def)| def);
        if removed.is_some() {
            info!(geofence_id = %id, "Geofence removed");
        }
        removed
    }

    pub fn clear(&self) {
        self.geofences.clear();
    }

    pub fn get(&self, id: &str) -> Option<GeofenceDefinition> {
        self.geofences.get(id).map(|g| g.clone())
    }

    /// Snapshot of all active definitions
    pub fn list_active(&self) -> Vec<GeofenceDefinition> {
        self.geofences
            .iter()
            .filter(|g| g.is_active())
            .map(|g| g.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.geofences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geofences.is_empty()
    }
}

impl Default for GeofenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
