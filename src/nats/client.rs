use anyhow::{Context, Result};
use async_nats::jetstream::{self, stream};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// NATS configuration
#[derive(Clone, Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    /// JetStream stream holding detected events
    pub stream_name: String,
    #[serde(default = "default_stream_subjects")]
    pub stream_subjects: Vec<String>,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,
    /// Subject carrying geofence commands
    #[serde(default = "default_geofence_subject")]
    pub geofence_subject: String,
    /// Subject (wildcards allowed) carrying position samples
    #[serde(default = "default_position_subject")]
    pub position_subject: String,
}

fn default_stream_subjects() -> Vec<String> {
    vec!["fencewatch.events.>".to_string()]
}

fn default_max_age_days() -> u64 {
    30
}

fn default_geofence_subject() -> String {
    "fencewatch.geofences".to_string()
}

fn default_position_subject() -> String {
    "fencewatch.positions.>".to_string()
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string()),
            stream_name: "FENCEWATCH_EVENTS".to_string(),
            stream_subjects: default_stream_subjects(),
            max_age_days: default_max_age_days(),
            geofence_subject: default_geofence_subject(),
            position_subject: default_position_subject(),
        }
    }
}

impl NatsConfig {
    /// Retention of the events stream, saturating on absurd day counts
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days.saturating_mul(86_400))
    }
}

/// NATS client with JetStream
pub struct NatsClient {
    client: async_nats::Client,
    jetstream: jetstream::Context,
    config: NatsConfig,
}

impl NatsClient {
    /// Connect to NATS and make sure the events stream exists
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", config.url);

        let client = async_nats::connect(&config.url)
            .await
            .context("Failed to connect to NATS")?;

        let jetstream = jetstream::new(client.clone());

        let nats_client = Self {
            client,
            jetstream,
            config,
        };

        nats_client.ensure_stream().await?;

        Ok(nats_client)
    }

    /// Ensure JetStream stream exists with proper configuration
    async fn ensure_stream(&self) -> Result<()> {
        if self.jetstream.get_stream(&self.config.stream_name).await.is_ok() {
            info!("Stream '{}' already exists", self.config.stream_name);
            return Ok(());
        }

        info!("Stream '{}' does not exist, creating...", self.config.stream_name);

        let stream_config = stream::Config {
            name: self.config.stream_name.clone(),
            subjects: self.config.stream_subjects.clone(),
            max_age: self.config.max_age(),
            storage: stream::StorageType::File,
            retention: stream::RetentionPolicy::Limits,
            ..Default::default()
        };

        self.jetstream
            .create_stream(stream_config)
            .await
            .context("Failed to create JetStream stream")?;

        info!("Created JetStream stream '{}'", self.config.stream_name);
        Ok(())
    }

    /// Get JetStream context for publishing
    pub fn jetstream(&self) -> &jetstream::Context {
        &self.jetstream
    }

    /// Get underlying NATS client
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    pub fn config(&self) -> &NatsConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_nats_config_uses_defaults() {
        let config: NatsConfig = toml::from_str(
            r#"
            url = "nats://example.com:4222"
            stream_name = "TEST_EVENTS"
            "#,
        )
        .unwrap();

        assert_eq!(config.stream_subjects, vec!["fencewatch.events.>".to_string()]);
        assert_eq!(config.geofence_subject, "fencewatch.geofences");
        assert_eq!(config.position_subject, "fencewatch.positions.>");
        assert_eq!(config.max_age_days, 30);
    }

    #[test]
    fn test_max_age_days_rejects_negative_and_saturates() {
        let negative = toml::from_str::<NatsConfig>(
            r#"
            url = "nats://localhost:4222"
            stream_name = "TEST_EVENTS"
            max_age_days = -1
            "#,
        );
        assert!(negative.is_err());

        let mut config = NatsConfig::default();
        assert_eq!(config.max_age(), Duration::from_secs(30 * 86_400));

        config.max_age_days = u64::MAX;
        assert_eq!(config.max_age(), Duration::from_secs(u64::MAX));
    }
}
