use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

// Re-export existing config types
pub use crate::engine::{CandidateMode, EngineConfig};
pub use crate::nats::NatsConfig;

/// Complete fencewatch configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FencewatchConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Startup data
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    /// JSON array of geofence definitions loaded before the first tick
    #[serde(default)]
    pub geofences_file: Option<PathBuf>,
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<FencewatchConfig> {
    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read config file '{}'", path))?;
    let config: FencewatchConfig =
        toml::from_str(&contents).context("Failed to parse config TOML")?;
    Ok(config)
}
