//! Ingestion pipeline configuration

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Ingestion pipeline settings
///
/// Controls the bounded event queue, the batching policy, and shutdown
/// behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Capacity of the bounded event queue; enqueue beyond this fails
    /// with a queue-full error (backpressure)
    pub queue_size: usize,

    /// Events per batch before a size-triggered emission
    pub max_batch_size: usize,

    /// Time-triggered emission interval in milliseconds
    pub flush_interval_ms: u64,

    /// Capacity of the batch hand-off channel between batcher and writer
    pub batch_queue_size: usize,

    /// Upper bound on how long `stop()` waits for the final flush, in
    /// milliseconds
    pub stop_timeout_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_size: 1024,
            max_batch_size: 100,
            flush_interval_ms: 1000,
            batch_queue_size: 8,
            stop_timeout_ms: 5000,
        }
    }
}

impl IngestConfig {
    /// Time-triggered emission interval
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Bound on the final drain during shutdown
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.queue_size == 0 {
            return Err(ConfigError::Invalid("ingest.queue_size must be > 0".into()));
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "ingest.max_batch_size must be > 0".into(),
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "ingest.flush_interval_ms must be > 0".into(),
            ));
        }
        if self.batch_queue_size == 0 {
            return Err(ConfigError::Invalid(
                "ingest.batch_queue_size must be > 0".into(),
            ));
        }
        Ok(())
    }
}
