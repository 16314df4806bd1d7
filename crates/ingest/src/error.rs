//! Ingestion error types

use std::time::Duration;

use thiserror::Error;

use pulse_store::StoreError;

/// Ingestion pipeline errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// The bounded event queue is at capacity (backpressure); callers may
    /// retry or drop
    #[error("ingest queue full")]
    QueueFull,

    /// The pipeline has stopped accepting writes
    #[error("ingestion pipeline stopped")]
    Closed,

    /// `stop()` exceeded its bound waiting for the final flush
    #[error("pipeline stop timed out after {0:?}")]
    StopTimeout(Duration),

    /// Sink-level failure surfaced through the pipeline
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A pipeline worker task panicked or was aborted
    #[error("pipeline worker failed: {0}")]
    Worker(String),
}
