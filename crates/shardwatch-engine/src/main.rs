//! Service binary for the Shardwatch artifact overlay.
//!
//! Wires the refresh loop, the HTTP feed source and the observer API
//! together and runs them until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `SHARDWATCH_CONFIG` or `shardwatch-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the shared artifact context
//! 4. Start the change listener that logs per-kind summaries
//! 5. Start the observer API server (if enabled)
//! 6. Run the refresh loop until Ctrl-C

mod error;
mod http_source;

use std::path::PathBuf;

use shardwatch_core::config::{LoggingConfig, ShardwatchConfig};
use shardwatch_core::summary::summarize;
use shardwatch_core::{ArtifactContext, HookEvent, RefreshService};
use shardwatch_types::ArtifactsUpdated;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::http_source::HttpArtifactSource;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "shardwatch-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the feed client or the observer
/// server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        endpoint = config.source.endpoint_url,
        success_interval_secs = config.schedule.success_interval_secs,
        jitter_window_secs = config.schedule.jitter_window_secs,
        failure_retry_secs = config.schedule.failure_retry_secs,
        "shardwatch-engine starting"
    );

    // 3. Build the shared context.
    let ctx = ArtifactContext::from_config(&config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // 4. Log a summary after every refresh.
    let listener = tokio::spawn(log_updates(ctx.clone(), ctx.subscribe()));

    // 5. Start the observer API server.
    let observer = if config.observer.enabled {
        let observer_config = config.observer.clone();
        let observer_ctx = ctx.clone();
        let observer_shutdown = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            shardwatch_observer::start_server(&observer_config, observer_ctx, observer_shutdown)
                .await
        }))
    } else {
        info!("Observer API disabled");
        None
    };

    // 6. Run the refresh loop.
    let source = HttpArtifactSource::new(&config.source)?;
    info!(endpoint = source.endpoint_url(), "HTTP feed source ready");
    let service = RefreshService::new(ctx, source, config.schedule.clone());
    let refresh = tokio::spawn(service.run(shutdown_rx));

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, shutting down");
    }
    info!("Shutdown requested");
    if shutdown_tx.send(true).is_err() {
        debug!("all shutdown receivers already gone");
    }

    refresh.await.map_err(|e| EngineError::Task {
        message: format!("refresh loop: {e}"),
    })?;
    if let Some(observer) = observer {
        observer.await.map_err(|e| EngineError::Task {
            message: format!("observer server: {e}"),
        })??;
    }
    listener.abort();

    info!("shardwatch-engine shutdown complete");
    Ok(())
}

/// Load configuration from `SHARDWATCH_CONFIG`, falling back to
/// `shardwatch-config.yaml` and then to defaults.
fn load_config() -> Result<ShardwatchConfig, EngineError> {
    let config_path = std::env::var("SHARDWATCH_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if config_path.exists() {
        return Ok(ShardwatchConfig::from_file(&config_path)?);
    }

    let mut config = ShardwatchConfig::default();
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Log per-kind target and fragment counts after each refresh.
async fn log_updates(ctx: ArtifactContext, mut rx: broadcast::Receiver<HookEvent>) {
    loop {
        match rx.recv().await {
            Ok(HookEvent::ArtifactsUpdated(update)) => {
                log_entity_delta(&update);
                let generation = ctx.snapshot().await;
                for summary in summarize(&generation) {
                    info!(
                        kind = %summary.kind,
                        targets = summary.targets.len(),
                        fragments = summary.fragments.len(),
                        "artifact kind summary"
                    );
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "change listener lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn log_entity_delta(update: &ArtifactsUpdated) {
    info!(
        old_entities = update.old.len(),
        new_entities = update.new.len(),
        "artifacts updated"
    );
}
