// Detection engine: owns all detection state and runs evaluation cycles

mod config;
mod runner;

pub use config::{CandidateMode, EngineConfig};
pub use runner::{dispatch_events, run_detection_loop};

use crate::cooldown::CooldownGate;
use crate::event::GeofenceEvent;
use crate::geofence::{GeofenceDefinition, GeofenceRegistry, ValidationError};
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::rules;
use crate::state::{ContainmentState, SampleOutcome, VehiclePositionSample, VehicleTracker};
use tracing::{debug, info, warn};

/// Outcome of a bulk geofence load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub rejected: usize,
}

/// Geofence violation detection engine.
///
/// One instance owns its registry, containment memory, latest vehicle
/// positions and cooldown gate. Instances share nothing, so several engines
/// can run side by side. All maps are concurrent; share the engine as
/// `Arc<DetectionEngine>`.
pub struct DetectionEngine {
    config: EngineConfig,
    registry: GeofenceRegistry,
    containment: ContainmentState,
    vehicles: VehicleTracker,
    cooldown: CooldownGate,

    /// Metrics tracker for monitoring
    pub metrics: EngineMetrics,
}

impl DetectionEngine {
    pub fn new(config: EngineConfig) -> Self {
        let cooldown = CooldownGate::new(config.cooldown_ms);

        Self {
            config,
            registry: GeofenceRegistry::new(),
            containment: ContainmentState::new(),
            vehicles: VehicleTracker::new(),
            cooldown,
            metrics: EngineMetrics::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &GeofenceRegistry {
        &self.registry
    }

    pub fn containment(&self) -> &ContainmentState {
        &self.containment
    }

    pub fn vehicles(&self) -> &VehicleTracker {
        &self.vehicles
    }

    pub fn cooldown(&self) -> &CooldownGate {
        &self.cooldown
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.get_snapshot()
    }

    /// Add or replace a geofence.
    ///
    /// Containment records of pairs the new definition takes out of
    /// consideration (inactive, or vehicle no longer assigned) are dropped, so
    /// bringing them back starts over with a first observation.
    pub fn upsert_geofence(&self, def: GeofenceDefinition) -> Result<(), ValidationError> {
        let id = def.id.trim().to_string();
        match self.registry.upsert(def) {
            Ok(previous) => {
                let dropped = match self.registry.get(&id) {
                    Some(stored) => self
                        .containment
                        .retain(|v, g| g != id || self.is_considered(&stored, v)),
                    None => 0,
                };
                info!(
                    geofence_id = %id,
                    updated = previous.is_some(),
                    records_dropped = dropped,
                    "Geofence registered"
                );
                Ok(())
            }
            Err(e) => {
                warn!(geofence_id = %id, error = %e, "Rejected invalid geofence");
                Err(e)
            }
        }
    }

    /// Remove a geofence and forget every vehicle's containment in it
    pub fn remove_geofence(&self, geofence_id: &str) -> Option<GeofenceDefinition> {
        let geofence_id = geofence_id.trim();
        let removed = self.registry.remove(geofence_id);
        let records = self.containment.remove_geofence(geofence_id);
        debug!(geofence_id = %geofence_id, records = records, "Containment records dropped");
        removed
    }

    pub fn clear_geofences(&self) {
        self.registry.clear();
        self.containment.clear();
        info!("All geofences cleared");
    }

    /// Replace the registry contents with `defs` (session start).
    ///
    /// Invalid definitions are skipped with a warning. Containment records of
    /// pairs that are no longer under consideration are dropped.
    pub fn load_geofences<I>(&self, defs: I) -> LoadReport
    where
        I: IntoIterator<Item = GeofenceDefinition>,
    {
        self.registry.clear();

        let mut report = LoadReport::default();
        for def in defs {
            let id = def.id.clone();
            match self.registry.upsert(def) {
                Ok(_) => report.loaded += 1,
                Err(e) => {
                    warn!(geofence_id = %id, error = %e, "Skipping invalid geofence");
                    report.rejected += 1;
                }
            }
        }

        self.containment.retain(|v, g| {
            self.registry
                .get(g)
                .is_some_and(|def| self.is_considered(&def, v))
        });

        info!(
            loaded = report.loaded,
            rejected = report.rejected,
            "Loaded geofences"
        );

        report
    }

    /// Record a position sample for the next evaluation cycle
    pub fn ingest_sample(&self, sample: VehiclePositionSample) -> SampleOutcome {
        let vehicle_id = sample.vehicle_id.clone();
        let timestamp = sample.timestamp;
        let outcome = self.vehicles.record(sample);

        if outcome != SampleOutcome::Accepted {
            self.metrics.record_rejected_sample();
            debug!(
                vehicle_id = %vehicle_id,
                timestamp = timestamp,
                outcome = ?outcome,
                "Position sample rejected"
            );
        }

        outcome
    }

    /// Forget a vehicle: latest position, containment and cooldown state
    pub fn remove_vehicle(&self, vehicle_id: &str) {
        self.vehicles.remove(vehicle_id);
        self.containment.remove_vehicle(vehicle_id);
        self.cooldown.remove_vehicle(vehicle_id);
        info!(vehicle_id = %vehicle_id, "Vehicle removed");
    }

    /// Run one evaluation cycle at `now_ms` over every online vehicle.
    ///
    /// Returns the events that survived the cooldown gate, in the order their
    /// (vehicle, geofence) pair was evaluated.
    pub fn evaluate_cycle(&self, now_ms: i64) -> Vec<GeofenceEvent> {
        self.metrics.record_cycle();

        let (online, stale) = self
            .vehicles
            .partition_online(now_ms, self.config.freshness_window_ms());
        if stale > 0 {
            self.metrics.record_stale(stale);
        }

        let active = self.registry.list_active();
        let mut events = Vec::new();

        for sample in &online {
            events.extend(self.evaluate_vehicle(sample, &active, now_ms));
        }

        debug!(
            vehicles = online.len(),
            stale = stale,
            geofences = active.len(),
            events = events.len(),
            "Evaluation cycle complete"
        );

        events
    }

    /// Ingest one sample and evaluate that vehicle immediately.
    ///
    /// The sample timestamp is used as "now" for the cooldown gate. Rejected
    /// samples produce no events.
    pub fn process_sample(&self, sample: VehiclePositionSample) -> Vec<GeofenceEvent> {
        if self.ingest_sample(sample.clone()) != SampleOutcome::Accepted {
            return Vec::new();
        }

        self.metrics.record_cycle();
        let active = self.registry.list_active();
        self.evaluate_vehicle(&sample, &active, sample.timestamp)
    }

    fn evaluate_vehicle(
        &self,
        sample: &VehiclePositionSample,
        active: &[GeofenceDefinition],
        now_ms: i64,
    ) -> Vec<GeofenceEvent> {
        active
            .iter()
            .filter(|g| self.is_candidate(g, &sample.vehicle_id))
            .filter_map(|g| self.evaluate_pair(sample, g, now_ms))
            .collect()
    }

    fn is_candidate(&self, geofence: &GeofenceDefinition, vehicle_id: &str) -> bool {
        match self.config.candidate_mode {
            CandidateMode::AllActive => true,
            CandidateMode::Assigned => geofence.is_assigned_to(vehicle_id),
        }
    }

    /// Pairs outside consideration keep no containment record
    fn is_considered(&self, geofence: &GeofenceDefinition, vehicle_id: &str) -> bool {
        geofence.is_active() && self.is_candidate(geofence, vehicle_id)
    }

    /// Evaluate a single (vehicle, geofence) pair; faults stay inside the pair
    fn evaluate_pair(
        &self,
        sample: &VehiclePositionSample,
        geofence: &GeofenceDefinition,
        now_ms: i64,
    ) -> Option<GeofenceEvent> {
        self.metrics.record_pair();

        let inside_now = match geofence.shape.contains(sample.position) {
            Some(inside) => inside,
            None => {
                warn!(
                    vehicle_id = %sample.vehicle_id,
                    geofence_id = %geofence.id,
                    "Containment not computable for geofence, skipping pair"
                );
                self.metrics.record_geometry_skip();
                return None;
            }
        };

        let transition = self
            .containment
            .transition(&sample.vehicle_id, &geofence.id, inside_now);
        let kind = rules::evaluate(geofence.rule_type, transition)?;

        if !self.cooldown.should_fire(&sample.vehicle_id, kind, now_ms) {
            self.metrics.record_suppressed();
            debug!(
                vehicle_id = %sample.vehicle_id,
                geofence_id = %geofence.id,
                event_type = %kind,
                "Violation suppressed by cooldown"
            );
            return None;
        }

        self.metrics.record_event();
        info!(
            vehicle_id = %sample.vehicle_id,
            geofence_id = %geofence.id,
            event_type = %kind,
            "Geofence event detected"
        );

        Some(GeofenceEvent::new(kind, sample, geofence))
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
