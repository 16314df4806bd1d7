//! Ingestion batcher
//!
//! Accepts events from a bounded queue and emits batches on a size or
//! time trigger.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pulse_store::Heartbeat;

use crate::error::IngestError;
use crate::metrics::IngestMetrics;

/// Batching policy knobs
#[derive(Debug, Clone)]
pub struct BatcherConfig {
    /// Capacity of the bounded event queue
    pub queue_size: usize,

    /// Events per batch before a size-triggered emission
    pub max_batch_size: usize,

    /// Time-triggered emission interval, measured from the last emission
    pub flush_interval: Duration,

    /// Capacity of the batch hand-off channel
    pub batch_queue_size: usize,

    /// Upper bound on how long `stop()` waits for the final flush
    pub stop_timeout: Duration,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            queue_size: 1024,
            max_batch_size: 100,
            flush_interval: Duration::from_secs(1),
            batch_queue_size: 8,
            stop_timeout: Duration::from_secs(5),
        }
    }
}

/// Cloneable write handle into the pipeline.
///
/// `enqueue` never blocks on the append/flush path; it only fails on the
/// bounded event queue's own capacity.
#[derive(Debug, Clone)]
pub struct BatcherHandle {
    tx: mpsc::Sender<Heartbeat>,
    cancel: CancellationToken,
    metrics: Arc<IngestMetrics>,
}

impl BatcherHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<Heartbeat>,
        cancel: CancellationToken,
        metrics: Arc<IngestMetrics>,
    ) -> Self {
        Self {
            tx,
            cancel,
            metrics,
        }
    }

    /// Add one event to the pipeline.
    ///
    /// Returns [`IngestError::QueueFull`] when the bounded queue is at
    /// capacity and [`IngestError::Closed`] once stop has begun.
    pub fn enqueue(&self, hb: Heartbeat) -> Result<(), IngestError> {
        if self.cancel.is_cancelled() {
            return Err(IngestError::Closed);
        }
        match self.tx.try_send(hb) {
            Ok(()) => {
                self.metrics.event_enqueued();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.event_rejected();
                Err(IngestError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(IngestError::Closed),
        }
    }
}

/// The buffering loop: single owner of the active buffer.
///
/// Buffer swaps happen inside this task, so concurrent `enqueue` calls
/// never observe a partially drained buffer.
pub(crate) struct Batcher {
    pub(crate) rx: mpsc::Receiver<Heartbeat>,
    pub(crate) batch_tx: mpsc::Sender<Vec<Heartbeat>>,
    pub(crate) cancel: CancellationToken,
    pub(crate) max_batch_size: usize,
    pub(crate) flush_interval: Duration,
    pub(crate) metrics: Arc<IngestMetrics>,
}

impl Batcher {
    pub(crate) async fn run(mut self) {
        let mut buf: Vec<Heartbeat> = Vec::with_capacity(self.max_batch_size);
        let mut interval = time::interval(self.flush_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.drain(&mut buf).await;
                    break;
                }
                event = self.rx.recv() => match event {
                    Some(hb) => {
                        buf.push(hb);
                        if buf.len() >= self.max_batch_size {
                            self.emit(&mut buf).await;
                            // the next time-triggered emission is measured
                            // from this one
                            interval.reset();
                        }
                    }
                    None => {
                        if !buf.is_empty() {
                            self.emit(&mut buf).await;
                        }
                        break;
                    }
                },
                _ = interval.tick() => {
                    if !buf.is_empty() {
                        self.emit(&mut buf).await;
                    }
                }
            }
        }
        debug!("batcher stopped");
    }

    /// Swap the active buffer for an empty one and hand it downstream.
    async fn emit(&self, buf: &mut Vec<Heartbeat>) {
        let batch = mem::replace(buf, Vec::with_capacity(self.max_batch_size));
        self.metrics.batch_emitted();
        if self.batch_tx.send(batch).await.is_err() {
            warn!("batch channel closed, dropping batch");
        }
    }

    /// Final drain on stop: pull whatever is already queued, emit it, and
    /// let the batch channel close when this task ends.
    async fn drain(&mut self, buf: &mut Vec<Heartbeat>) {
        while let Ok(hb) = self.rx.try_recv() {
            buf.push(hb);
            if buf.len() >= self.max_batch_size {
                self.emit(buf).await;
            }
        }
        if !buf.is_empty() {
            self.emit(buf).await;
        }
        debug!("batcher drained on stop");
    }
}
