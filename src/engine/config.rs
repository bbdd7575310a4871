use crate::cooldown::DEFAULT_COOLDOWN_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which geofences a vehicle is checked against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateMode {
    /// Every active geofence applies to every vehicle
    #[default]
    AllActive,
    /// Only active geofences listing the vehicle in `assigned_vehicles`
    Assigned,
}

/// Configuration for the detection engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval between evaluation cycles (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// A vehicle is online if its last sample is at most this old (seconds)
    #[serde(default = "default_freshness_window_secs")]
    pub freshness_window_secs: i64,

    /// Minimum time between two violation alerts of the same kind per vehicle
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: i64,

    #[serde(default)]
    pub candidate_mode: CandidateMode,

    /// Also evaluate a vehicle as soon as one of its samples arrives
    #[serde(default)]
    pub evaluate_on_sample: bool,
}

fn default_tick_interval_ms() -> u64 {
    5_000
}

fn default_freshness_window_secs() -> i64 {
    600
}

fn default_cooldown_ms() -> i64 {
    DEFAULT_COOLDOWN_MS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            freshness_window_secs: default_freshness_window_secs(),
            cooldown_ms: default_cooldown_ms(),
            candidate_mode: CandidateMode::default(),
            evaluate_on_sample: false,
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn freshness_window_ms(&self) -> i64 {
        self.freshness_window_secs.saturating_mul(1000)
    }

    /// Apply env var overrides; unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("FENCEWATCH_TICK_INTERVAL_MS") {
            if let Ok(n) = v.parse::<u64>() {
                self.tick_interval_ms = n;
            }
        }
        if let Ok(v) = std::env::var("FENCEWATCH_FRESHNESS_WINDOW_SECS") {
            if let Ok(n) = v.parse::<i64>() {
                self.freshness_window_secs = n;
            }
        }
        if let Ok(v) = std::env::var("FENCEWATCH_COOLDOWN_MS") {
            if let Ok(n) = v.parse::<i64>() {
                self.cooldown_ms = n;
            }
        }

        self
    }
}
