//! Pulse - Ingestion pipeline
//!
//! Buffers validated heartbeat events and batch-appends them into the
//! store.
//!
//! # Architecture
//!
//! ```text
//! [HTTP handlers] --try_send--> [event queue] --> [Batcher]
//!     --Vec<Heartbeat>--> [batch channel] --> [FlushCoordinator] --> [AppendSink]
//! ```
//!
//! The batcher emits a batch when the buffer reaches `max_batch_size` or
//! when `flush_interval` elapses since the last emission, whichever comes
//! first. The coordinator is the sole consumer of batches and the sole
//! writer to the sink; flushes are deduplicated per sink name through
//! [`FlushGroup`], so concurrent flush requests collapse into one
//! underlying operation.
//!
//! Ingestion is best-effort: a row that fails to append or a batch whose
//! flush fails is logged, counted, and dropped without retry. The write
//! path acknowledges enqueue only, never durability.
//!
//! # Example
//!
//! ```ignore
//! use pulse_ingest::{BatcherConfig, IngestPipeline};
//!
//! let sink = store.appender()?;
//! let pipeline = IngestPipeline::spawn(BatcherConfig::default(), sink);
//! let handle = pipeline.handle();
//!
//! handle.enqueue(heartbeat)?; // QueueFull on backpressure
//!
//! pipeline.stop().await?;    // drains and flushes the final batch
//! ```

mod batcher;
mod error;
mod metrics;
mod pipeline;
mod singleflight;
mod writer;

pub use batcher::{BatcherConfig, BatcherHandle};
pub use error::IngestError;
pub use metrics::{IngestMetrics, MetricsSnapshot};
pub use pipeline::IngestPipeline;
pub use singleflight::FlushGroup;

#[cfg(test)]
mod test_util;

#[cfg(test)]
mod pipeline_test;
#[cfg(test)]
mod singleflight_test;
