use anyhow::Result;
use fencewatch::config::{load_config, FencewatchConfig};
use fencewatch::engine::{run_detection_loop, DetectionEngine};
use fencewatch::feed::load_geofences_file;
use fencewatch::nats::{run_feed_subscriber, NatsClient};
use fencewatch::sink::{EventSink, NatsEventSink};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fencewatch=info".into()),
        )
        .init();

    info!("Fencewatch starting...");

    let config = match std::env::var("FENCEWATCH_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading configuration");
            load_config(&path)?
        }
        Err(_) => FencewatchConfig::default(),
    };

    let engine = Arc::new(DetectionEngine::new(config.engine.clone().with_env_overrides()));

    if let Some(path) = &config.bootstrap.geofences_file {
        let geofences = load_geofences_file(path)?;
        engine.load_geofences(geofences);
    }

    let nats = NatsClient::connect(config.nats.clone()).await?;
    let sink: Arc<dyn EventSink> = Arc::new(NatsEventSink::new(nats.jetstream().clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let detection = tokio::spawn(run_detection_loop(
        engine.clone(),
        sink.clone(),
        shutdown_rx,
    ));

    let feed_engine = engine.clone();
    let feed_sink = sink.clone();
    let feed_client = nats.client().clone();
    let feed_config = config.nats.clone();
    tokio::spawn(async move {
        if let Err(e) = run_feed_subscriber(feed_engine, feed_sink, feed_client, feed_config).await
        {
            error!(error = %e, "Feed subscriber failed");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    let _ = shutdown_tx.send(true);
    if let Err(e) = detection.await {
        error!(error = %e, "Detection loop task failed");
    }

    info!(metrics = ?engine.metrics_snapshot(), "Fencewatch stopped");
    Ok(())
}
