//! Pipeline lifecycle
//!
//! Spawns the batcher and flush coordinator tasks and coordinates their
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pulse_store::AppendSink;

use crate::batcher::{Batcher, BatcherConfig, BatcherHandle};
use crate::error::IngestError;
use crate::metrics::IngestMetrics;
use crate::writer::FlushCoordinator;

/// A running ingestion pipeline: batcher task + flush coordinator task.
pub struct IngestPipeline {
    handle: BatcherHandle,
    cancel: CancellationToken,
    stop_timeout: Duration,
    batcher_task: JoinHandle<()>,
    writer_task: JoinHandle<Result<(), IngestError>>,
    metrics: Arc<IngestMetrics>,
}

impl IngestPipeline {
    /// Spawn the pipeline over the given sink.
    ///
    /// Call once per sink; the coordinator assumes single-writer access.
    pub fn spawn<S: AppendSink + 'static>(config: BatcherConfig, sink: S) -> Self {
        let metrics = Arc::new(IngestMetrics::new());
        let cancel = CancellationToken::new();
        let (event_tx, event_rx) = mpsc::channel(config.queue_size);
        let (batch_tx, batch_rx) = mpsc::channel(config.batch_queue_size);

        let batcher = Batcher {
            rx: event_rx,
            batch_tx,
            cancel: cancel.clone(),
            max_batch_size: config.max_batch_size,
            flush_interval: config.flush_interval,
            metrics: Arc::clone(&metrics),
        };
        let writer = FlushCoordinator::new(batch_rx, sink, Arc::clone(&metrics));

        info!(
            queue_size = config.queue_size,
            max_batch_size = config.max_batch_size,
            flush_interval = ?config.flush_interval,
            "ingestion pipeline started"
        );

        Self {
            handle: BatcherHandle::new(event_tx, cancel.clone(), Arc::clone(&metrics)),
            cancel,
            stop_timeout: config.stop_timeout,
            batcher_task: tokio::spawn(batcher.run()),
            writer_task: tokio::spawn(writer.run()),
            metrics,
        }
    }

    /// A cloneable write handle for HTTP handlers.
    pub fn handle(&self) -> BatcherHandle {
        self.handle.clone()
    }

    /// Shared pipeline metrics.
    pub fn metrics(&self) -> Arc<IngestMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Stop accepting writes, drain and flush the remaining buffered
    /// events, and return the terminal flush result.
    ///
    /// Bounded by `stop_timeout`; on timeout the worker tasks are left to
    /// finish in the background and an error is returned.
    pub async fn stop(self) -> Result<(), IngestError> {
        info!("stopping ingestion pipeline");
        self.cancel.cancel();
        drop(self.handle);

        let stop_timeout = self.stop_timeout;
        let shutdown = async move {
            if let Err(e) = self.batcher_task.await {
                return Err(IngestError::Worker(e.to_string()));
            }
            match self.writer_task.await {
                Ok(result) => result,
                Err(e) => Err(IngestError::Worker(e.to_string())),
            }
        };
        match tokio::time::timeout(stop_timeout, shutdown).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?stop_timeout, "pipeline stop timed out");
                Err(IngestError::StopTimeout(stop_timeout))
            }
        }
    }
}
