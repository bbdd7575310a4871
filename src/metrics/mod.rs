use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the detection engine
#[derive(Default)]
pub struct EngineMetrics {
    /// Evaluation cycles run (timer ticks and on-sample evaluations)
    cycles: AtomicU64,

    /// (vehicle, geofence) pairs evaluated
    pairs_evaluated: AtomicU64,

    /// Events that passed the cooldown gate
    events_emitted: AtomicU64,

    /// Violation events dropped by the cooldown gate
    violations_suppressed: AtomicU64,

    /// Vehicles skipped because their last sample was stale
    stale_vehicles_skipped: AtomicU64,

    /// Samples rejected as out-of-order or invalid
    samples_rejected: AtomicU64,

    /// Pairs skipped because containment could not be computed
    geometry_skips: AtomicU64,

    /// Failed sink dispatches
    dispatch_failures: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pair(&self) {
        self.pairs_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.violations_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self, count: usize) {
        self.stale_vehicles_skipped
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_rejected_sample(&self) {
        self.samples_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geometry_skip(&self) {
        self.geometry_skips.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            pairs_evaluated: self.pairs_evaluated.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            violations_suppressed: self.violations_suppressed.load(Ordering::Relaxed),
            stale_vehicles_skipped: self.stale_vehicles_skipped.load(Ordering::Relaxed),
            samples_rejected: self.samples_rejected.load(Ordering::Relaxed),
            geometry_skips: self.geometry_skips.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub pairs_evaluated: u64,
    pub events_emitted: u64,
    pub violations_suppressed: u64,
    pub stale_vehicles_skipped: u64,
    pub samples_rejected: u64,
    pub geometry_skips: u64,
    pub dispatch_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = EngineMetrics::new();
        assert_eq!(metrics.get_snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters() {
        let metrics = EngineMetrics::new();

        metrics.record_cycle();
        metrics.record_pair();
        metrics.record_pair();
        metrics.record_event();
        metrics.record_suppressed();
        metrics.record_stale(3);
        metrics.record_rejected_sample();
        metrics.record_geometry_skip();
        metrics.record_dispatch_failure();

        let snapshot = metrics.get_snapshot();
        assert_eq!(snapshot.cycles, 1);
        assert_eq!(snapshot.pairs_evaluated, 2);
        assert_eq!(snapshot.events_emitted, 1);
        assert_eq!(snapshot.violations_suppressed, 1);
        assert_eq!(snapshot.stale_vehicles_skipped, 3);
        assert_eq!(snapshot.samples_rejected, 1);
        assert_eq!(snapshot.geometry_skips, 1);
        assert_eq!(snapshot.dispatch_failures, 1);
    }

    #[test]
    fn test_concurrent_access() {
        let metrics = Arc::new(EngineMetrics::new());
        let mut handles = vec![];

        // Spawn 10 threads, each recording 100 pairs
        for _ in 0..10 {
            let metrics_clone = Arc::clone(&metrics);
            let handle = thread::spawn(move || {
                for _ in 0..100 {
                    metrics_clone.record_pair();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.get_snapshot().pairs_evaluated, 1000);
    }
}
