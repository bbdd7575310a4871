use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Change of containment between two consecutive evaluations of a pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    None,
    Entered,
    Exited,
}

/// Per (vehicle, geofence) "was inside" memory.
///
/// Each pair lives in its own map slot, so updates for different pairs never
/// contend on shared state beyond the DashMap shard lock.
pub struct ContainmentState {
    records: DashMap<(String, String), bool>,
}

impl ContainmentState {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Compare `inside_now` against the remembered state and record it.
    ///
    /// The first observation of a pair never produces a transition: a vehicle
    /// first seen inside a geofence has not "entered" it. Only the next
    /// observed flip fires.
    pub fn transition(&self, vehicle_id: &str, geofence_id: &str, inside_now: bool) -> Transition {
        let key = (vehicle_id.to_string(), geofence_id.to_string());
        let previous = self.records.insert(key, inside_now);

        match previous {
            Some(false) if inside_now => Transition::Entered,
            Some(true) if !inside_now => Transition::Exited,
            _ => Transition::None,
        }
    }

    pub fn was_inside(&self, vehicle_id: &str, geofence_id: &str) -> Option<bool> {
        self.records
            .get(&(vehicle_id.to_string(), geofence_id.to_string()))
            .map(|r| *r)
    }

    /// Drop every record of a vehicle; returns how many were removed
    pub fn remove_vehicle(&self, vehicle_id: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|(v, _), _| v != vehicle_id);
        before - self.records.len()
    }

    /// Drop every record of a geofence; returns how many were removed
    pub fn remove_geofence(&self, geofence_id: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|(_, g), _| g != geofence_id);
        before - self.records.len()
    }

    /// Keep only records whose (vehicle, geofence) pair satisfies `keep`;
    /// returns how many were removed
    pub fn retain<F>(&self, keep: F) -> usize
    where
        F: Fn(&str, &str) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|(v, g), _| keep(v, g));
        before - self.records.len()
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ContainmentState {
    fn default() -> Self {
        Self::new()
    }
}
