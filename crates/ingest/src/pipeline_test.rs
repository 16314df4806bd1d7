//! End-to-end pipeline tests

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::batcher::BatcherConfig;
use crate::error::IngestError;
use crate::pipeline::IngestPipeline;
use crate::test_util::{MockSink, hb};

fn test_config() -> BatcherConfig {
    BatcherConfig {
        queue_size: 1024,
        max_batch_size: 100,
        flush_interval: Duration::from_millis(50),
        batch_queue_size: 8,
        stop_timeout: Duration::from_secs(5),
    }
}

#[tokio::test(start_paused = true)]
async fn test_every_enqueued_event_reaches_the_sink() {
    let (sink, state) = MockSink::new();
    let pipeline = IngestPipeline::spawn(test_config(), sink);
    let handle = pipeline.handle();

    for user_id in 0..250 {
        handle.enqueue(hb(user_id)).unwrap();
    }
    pipeline.stop().await.unwrap();

    assert_eq!(state.row_users(), (0..250).collect::<Vec<_>>());
    assert!(state.flush_calls() >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_flushes_partial_buffer() {
    let (sink, state) = MockSink::new();
    let pipeline = IngestPipeline::spawn(test_config(), sink);
    let handle = pipeline.handle();

    for user_id in 0..37 {
        handle.enqueue(hb(user_id)).unwrap();
    }
    pipeline.stop().await.unwrap();

    assert_eq!(state.row_users().len(), 37);
    assert!(state.closed.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_stop_propagates_terminal_flush_error() {
    let (sink, state) = MockSink::new();
    state.fail_flush.store(true, Ordering::SeqCst);
    let pipeline = IngestPipeline::spawn(test_config(), sink);
    let handle = pipeline.handle();

    for user_id in 0..5 {
        handle.enqueue(hb(user_id)).unwrap();
    }
    let err = pipeline.stop().await.unwrap_err();
    assert!(matches!(err, IngestError::Store(_)));
}

#[tokio::test(start_paused = true)]
async fn test_enqueue_after_stop_rejected() {
    let (sink, _state) = MockSink::new();
    let pipeline = IngestPipeline::spawn(test_config(), sink);
    let handle = pipeline.handle();

    pipeline.stop().await.unwrap();

    let err = handle.enqueue(hb(1)).unwrap_err();
    assert!(matches!(err, IngestError::Closed));
}

#[tokio::test(start_paused = true)]
async fn test_metrics_track_the_flow() {
    let (sink, _state) = MockSink::new();
    let pipeline = IngestPipeline::spawn(test_config(), sink);
    let handle = pipeline.handle();
    let metrics = pipeline.metrics();

    for user_id in 0..120 {
        handle.enqueue(hb(user_id)).unwrap();
    }
    pipeline.stop().await.unwrap();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.events_enqueued, 120);
    assert_eq!(snapshot.rows_appended, 120);
    assert!(snapshot.batches_emitted >= 2);
    assert_eq!(snapshot.append_errors, 0);
}
