//! Ingestion metrics
//!
//! Lock-free counters shared between the pipeline tasks and diagnostics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the ingestion pipeline
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Events accepted into the queue
    pub events_enqueued: AtomicU64,

    /// Events rejected with queue-full
    pub events_rejected: AtomicU64,

    /// Batches emitted by the batcher
    pub batches_emitted: AtomicU64,

    /// Rows handed to the sink
    pub rows_appended: AtomicU64,

    /// Rows dropped by append failures
    pub append_errors: AtomicU64,

    /// Flushes performed (led flights)
    pub flushes: AtomicU64,

    /// Flush requests that piggybacked on an in-flight flush
    pub flushes_shared: AtomicU64,

    /// Flushes that failed
    pub flush_errors: AtomicU64,
}

impl IngestMetrics {
    pub const fn new() -> Self {
        Self {
            events_enqueued: AtomicU64::new(0),
            events_rejected: AtomicU64::new(0),
            batches_emitted: AtomicU64::new(0),
            rows_appended: AtomicU64::new(0),
            append_errors: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            flushes_shared: AtomicU64::new(0),
            flush_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn event_enqueued(&self) {
        self.events_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn event_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn batch_emitted(&self) {
        self.batches_emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn rows_appended(&self, count: u64) {
        self.rows_appended.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn append_error(&self) {
        self.append_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn flush_shared(&self) {
        self.flushes_shared.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn flush_error(&self) {
        self.flush_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_enqueued: self.events_enqueued.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            batches_emitted: self.batches_emitted.load(Ordering::Relaxed),
            rows_appended: self.rows_appended.load(Ordering::Relaxed),
            append_errors: self.append_errors.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            flushes_shared: self.flushes_shared.load(Ordering::Relaxed),
            flush_errors: self.flush_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of ingestion metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub events_enqueued: u64,
    pub events_rejected: u64,
    pub batches_emitted: u64,
    pub rows_appended: u64,
    pub append_errors: u64,
    pub flushes: u64,
    pub flushes_shared: u64,
    pub flush_errors: u64,
}
