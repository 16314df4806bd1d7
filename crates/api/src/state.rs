//! Application state

use std::time::Duration;

use pulse_analytics::AnalyticsEngine;
use pulse_ingest::BatcherHandle;
use pulse_store::Store;

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Write handle into the ingestion pipeline
    pub ingest: BatcherHandle,

    /// Read-side aggregate queries
    pub engine: AnalyticsEngine,

    /// Store handle for maintenance operations
    pub store: Store,

    /// Retention window applied by the cleanup endpoint
    pub cleanup_retention: Duration,
}

impl AppState {
    pub fn new(
        ingest: BatcherHandle,
        engine: AnalyticsEngine,
        store: Store,
        cleanup_retention: Duration,
    ) -> Self {
        Self {
            ingest,
            engine,
            store,
            cleanup_retention,
        }
    }
}
