//! Serve command - run the pulse server
//!
//! Wires store, ingestion pipeline, cleanup job, and HTTP API, and
//! coordinates graceful shutdown.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use pulse_analytics::AnalyticsEngine;
use pulse_api::{AppState, build_router};
use pulse_config::{CleanupConfig, Config, IngestConfig};
use pulse_ingest::{BatcherConfig, IngestPipeline};
use pulse_store::Store;

/// Run the serve command
pub async fn run(config_path: Option<PathBuf>, log_level: Option<String>) -> Result<()> {
    let config = load_config(config_path)?;
    crate::init_logging(&config.log, log_level.as_deref())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.addr,
        data_dir = %config.store.data_dir.display(),
        "pulse starting"
    );

    if let Err(e) = run_server(config).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("pulse shutdown complete");
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            // explicitly provided config must exist
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            Config::from_file(&path).context("failed to load configuration")
        }
        None => {
            let default_paths = [
                PathBuf::from("configs/pulse.toml"),
                PathBuf::from("pulse.toml"),
            ];
            for path in &default_paths {
                if path.exists() {
                    return Config::from_file(path).context("failed to load configuration");
                }
            }
            Ok(Config::default())
        }
    }
}

fn batcher_config(ingest: &IngestConfig) -> BatcherConfig {
    BatcherConfig {
        queue_size: ingest.queue_size,
        max_batch_size: ingest.max_batch_size,
        flush_interval: ingest.flush_interval(),
        batch_queue_size: ingest.batch_queue_size,
        stop_timeout: ingest.stop_timeout(),
    }
}

async fn run_server(config: Config) -> Result<()> {
    let store = Store::open(&config.store.data_dir)?;
    let sink = store.appender()?;
    let pipeline = IngestPipeline::spawn(batcher_config(&config.ingest), sink);

    let cancel = CancellationToken::new();
    let cleanup_task = spawn_cleanup_job(store.clone(), config.cleanup.clone(), cancel.clone());

    let state = AppState::new(
        pipeline.handle(),
        AnalyticsEngine::new(store.clone()),
        store.clone(),
        config.cleanup.retention(),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    info!(addr = %config.server.addr, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    // shutdown order: stop accepting events, drain the pipeline, then
    // stop the cleanup job and checkpoint what was flushed
    if let Err(e) = pipeline.stop().await {
        error!(error = %e, "ingestion pipeline did not stop cleanly");
    }
    cancel.cancel();
    let _ = cleanup_task.await;
    if let Err(e) = store.checkpoint() {
        warn!(error = %e, "final checkpoint failed");
    }

    Ok(())
}

/// Periodically delete expired rows and checkpoint the store.
fn spawn_cleanup_job(
    store: Store,
    config: CleanupConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // skip the immediate first tick
        interval.tick().await;

        info!(
            interval = ?config.interval(),
            retention = ?config.retention(),
            "cleanup job started"
        );
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let store = store.clone();
                    let retention = config.retention();
                    let result = tokio::task::spawn_blocking(move || {
                        let cutoff = chrono::Utc::now() - retention;
                        let deleted = store.delete_older_than(cutoff)?;
                        store.checkpoint()?;
                        Ok::<usize, pulse_store::StoreError>(deleted)
                    })
                    .await;
                    match result {
                        Ok(Ok(deleted)) => info!(deleted, "cleanup run completed"),
                        Ok(Err(e)) => warn!(error = %e, "cleanup run failed"),
                        Err(e) => warn!(error = %e, "cleanup task failed"),
                    }
                }
            }
        }
        info!("cleanup job stopped");
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received sigterm"),
    }
}
