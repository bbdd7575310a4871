use crate::geo::Coordinate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A single position report for a vehicle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehiclePositionSample {
    pub vehicle_id: String,

    /// Unix epoch milliseconds (device time)
    pub timestamp: i64,

    pub position: Coordinate,
}

/// Result of offering a sample to the tracker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    Accepted,
    /// Older than the last accepted sample for the vehicle
    OutOfOrder,
    /// Empty vehicle id or position outside the WGS84 range
    InvalidPosition,
}

/// Latest accepted position per vehicle
pub struct VehicleTracker {
    latest: DashMap<String, VehiclePositionSample>,
}

impl VehicleTracker {
    pub fn new() -> Self {
        Self {
            latest: DashMap::new(),
        }
    }

    /// Record a sample if it is valid and not older than the last one seen.
    ///
    /// Samples with the same timestamp as the current one replace it.
    pub fn record(&self, sample: VehiclePositionSample) -> SampleOutcome {
        if sample.vehicle_id.is_empty() || !sample.position.is_valid() {
            return SampleOutcome::InvalidPosition;
        }

        match self.latest.entry(sample.vehicle_id.clone()) {
            Entry::Occupied(mut current) => {
                if sample.timestamp < current.get().timestamp {
                    return SampleOutcome::OutOfOrder;
                }
                current.insert(sample);
            }
            Entry::Vacant(slot) => {
                slot.insert(sample);
            }
        }

        SampleOutcome::Accepted
    }

    pub fn latest(&self, vehicle_id: &str) -> Option<VehiclePositionSample> {
        self.latest.get(vehicle_id).map(|s| s.clone())
    }

    /// True if the vehicle's latest sample is within `window_ms` of `now_ms`
    pub fn is_online(&self, vehicle_id: &str, now_ms: i64, window_ms: i64) -> bool {
        self.latest
            .get(vehicle_id)
            .map(|s| is_fresh(&s, now_ms, window_ms))
            .unwrap_or(false)
    }

    /// Partition tracked vehicles into (online samples, stale vehicle count)
    pub fn partition_online(
        &self,
        now_ms: i64,
        window_ms: i64,
    ) -> (Vec<VehiclePositionSample>, usize) {
        let mut online = Vec::new();
        let mut stale = 0;

        for entry in self.latest.iter() {
            if is_fresh(entry.value(), now_ms, window_ms) {
                online.push(entry.value().clone());
            } else {
                stale += 1;
            }
        }

        // Stable evaluation order within a cycle
        online.sort_by(|a, b| a.vehicle_id.cmp(&b.vehicle_id));
        (online, stale)
    }

    /// Latest samples of every vehicle that is currently online
    pub fn online(&self, now_ms: i64, window_ms: i64) -> Vec<VehiclePositionSample> {
        self.partition_online(now_ms, window_ms).0
    }

    pub fn remove(&self, vehicle_id: &str) -> Option<VehiclePositionSample> {
        self.latest.remove(vehicle_id).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

impl Default for VehicleTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn is_fresh(sample: &VehiclePositionSample, now_ms: i64, window_ms: i64) -> bool {
    now_ms.saturating_sub(sample.timestamp) <= window_ms
}
