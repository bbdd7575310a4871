// Alert cooldown gate
//
// Per (vehicle, violation kind) notification throttle. Purely time based: a
// violation that is still ongoing fires again once the window has elapsed.
// State is in-memory only (resets on restart).

use crate::rules::EventKind;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Default cooldown window: 5 minutes
pub const DEFAULT_COOLDOWN_MS: i64 = 300_000;

pub struct CooldownGate {
    window_ms: i64,
    last_fired: DashMap<(String, EventKind), i64>,
}

impl CooldownGate {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            last_fired: DashMap::new(),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Decide whether an event may be dispatched at `now_ms`.
    ///
    /// Non-violation kinds always pass and leave no record. A violation passes
    /// if none of the same kind fired for the vehicle within the window; a
    /// passing violation records `now_ms` as its last fire time.
    pub fn should_fire(&self, vehicle_id: &str, kind: EventKind, now_ms: i64) -> bool {
        if !kind.is_violation() {
            return true;
        }

        match self.last_fired.entry((vehicle_id.to_string(), kind)) {
            Entry::Occupied(mut last) => {
                if now_ms.saturating_sub(*last.get()) < self.window_ms {
                    return false;
                }
                last.insert(now_ms);
            }
            Entry::Vacant(slot) => {
                slot.insert(now_ms);
            }
        }

        true
    }

    /// Last dispatch time of a violation kind for a vehicle
    pub fn last_fired_at(&self, vehicle_id: &str, kind: EventKind) -> Option<i64> {
        self.last_fired
            .get(&(vehicle_id.to_string(), kind))
            .map(|t| *t)
    }

    pub fn remove_vehicle(&self, vehicle_id: &str) {
        self.last_fired.retain(|(v, _), _| v != vehicle_id);
    }

    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_violation_fires() {
        let gate = CooldownGate::default();
        assert!(gate.should_fire("truck-1", EventKind::ViolationEnter, 1_000));
        assert_eq!(gate.last_fired_at("truck-1", EventKind::ViolationEnter), Some(1_000));
    }

    #[test]
    fn test_second_violation_within_window_suppressed() {
        let gate = CooldownGate::default();
        assert!(gate.should_fire("truck-1", EventKind::ViolationEnter, 1_000));
        assert!(!gate.should_fire("truck-1", EventKind::ViolationEnter, 61_000));
        // Suppressed attempt does not extend the window
        assert_eq!(gate.last_fired_at("truck-1", EventKind::ViolationEnter), Some(1_000));
    }

    #[test]
    fn test_fires_again_after_window() {
        let gate = CooldownGate::default();
        assert!(gate.should_fire("truck-1", EventKind::ViolationEnter, 0));
        assert!(!gate.should_fire("truck-1", EventKind::ViolationEnter, 299_999));
        assert!(gate.should_fire("truck-1", EventKind::ViolationEnter, 300_000));
        assert!(!gate.should_fire("truck-1", EventKind::ViolationEnter, 300_001));
    }

    #[test]
    fn test_kinds_and_vehicles_are_separate() {
        let gate = CooldownGate::default();
        assert!(gate.should_fire("truck-1", EventKind::ViolationEnter, 1_000));
        assert!(gate.should_fire("truck-1", EventKind::ViolationExit, 1_000));
        assert!(gate.should_fire("truck-2", EventKind::ViolationEnter, 1_000));
        assert!(!gate.should_fire("truck-2", EventKind::ViolationEnter, 2_000));
    }

    #[test]
    fn test_plain_events_never_gated() {
        let gate = CooldownGate::default();
        for t in 0..5 {
            assert!(gate.should_fire("truck-1", EventKind::Enter, t));
            assert!(gate.should_fire("truck-1", EventKind::Exit, t));
        }
        assert!(gate.is_empty());
    }

    #[test]
    fn test_configurable_window() {
        let gate = CooldownGate::new(10);
        assert_eq!(gate.window_ms(), 10);
        assert!(gate.should_fire("truck-1", EventKind::ViolationExit, 100));
        assert!(!gate.should_fire("truck-1", EventKind::ViolationExit, 109));
        assert!(gate.should_fire("truck-1", EventKind::ViolationExit, 110));
    }

    #[test]
    fn test_remove_vehicle_resets_cooldown() {
        let gate = CooldownGate::default();
        assert!(gate.should_fire("truck-1", EventKind::ViolationEnter, 1_000));
        gate.remove_vehicle("truck-1");
        assert!(gate.should_fire("truck-1", EventKind::ViolationEnter, 2_000));
    }
}
