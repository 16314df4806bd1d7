//! Flush coordinator
//!
//! Sole consumer of emitted batches and sole writer to the append sink.
//! Required because the store's bulk append path is not safe for
//! concurrent writers.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{error, trace, warn};

use pulse_store::{AppendSink, Heartbeat, StoreError};

use crate::metrics::IngestMetrics;
use crate::singleflight::FlushGroup;
use crate::IngestError;

/// Flush results are shared between deduplicated callers, so the error
/// side must be cloneable.
pub(crate) type SharedFlushResult = Result<(), Arc<StoreError>>;

pub(crate) struct FlushCoordinator<S> {
    rx: mpsc::Receiver<Vec<Heartbeat>>,
    sink: Arc<Mutex<S>>,
    flush_group: Arc<FlushGroup<SharedFlushResult>>,
    metrics: Arc<IngestMetrics>,
}

impl<S: AppendSink + 'static> FlushCoordinator<S> {
    pub(crate) fn new(
        rx: mpsc::Receiver<Vec<Heartbeat>>,
        sink: S,
        metrics: Arc<IngestMetrics>,
    ) -> Self {
        Self {
            rx,
            sink: Arc::new(Mutex::new(sink)),
            flush_group: Arc::new(FlushGroup::new()),
            metrics,
        }
    }

    /// Consume batches until the producer side closes, then close the
    /// sink. The close performs the final flush; its error is the
    /// terminal result `stop()` reports.
    pub(crate) async fn run(mut self) -> Result<(), IngestError> {
        while let Some(batch) = self.rx.recv().await {
            self.write_batch(&batch).await;
        }
        let result = lock(&self.sink).close();
        if let Err(ref e) = result {
            self.metrics.flush_error();
            error!(error = %e, "final sink close failed");
        }
        result.map_err(IngestError::from)
    }

    /// Append every row of the batch, then issue one deduplicated flush.
    ///
    /// A row that fails to append is logged and skipped; it does not
    /// abort the rest of the batch. A failed flush is logged and not
    /// retried - rows appended before it are best-effort.
    async fn write_batch(&self, batch: &[Heartbeat]) {
        if batch.is_empty() {
            return;
        }

        let mut appended = 0usize;
        {
            let mut sink = lock(&self.sink);
            for hb in batch {
                match sink.append_row(hb) {
                    Ok(()) => appended += 1,
                    Err(e) => {
                        self.metrics.append_error();
                        warn!(
                            error = %e,
                            user_id = hb.user_id,
                            room_id = hb.room_id,
                            "dropping row that failed to append"
                        );
                    }
                }
            }
        }
        if appended == 0 {
            return;
        }
        self.metrics.rows_appended(appended as u64);

        let key = lock(&self.sink).name().to_string();
        let sink = Arc::clone(&self.sink);
        let (result, shared) = self
            .flush_group
            .run(&key, async move { lock(&sink).flush().map_err(Arc::new) })
            .await;
        if shared {
            self.metrics.flush_shared();
        } else {
            self.metrics.flush();
        }
        match result {
            Ok(()) => trace!(rows = appended, sink = %key, "batch flushed"),
            Err(e) => {
                self.metrics.flush_error();
                error!(error = %e, sink = %key, "batch flush failed, rows not retried");
            }
        }
    }
}

fn lock<S>(sink: &Arc<Mutex<S>>) -> std::sync::MutexGuard<'_, S> {
    sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
