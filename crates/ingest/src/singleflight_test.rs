//! Tests for flush deduplication

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;
use tokio::task::JoinSet;

use crate::singleflight::FlushGroup;

#[tokio::test]
async fn test_single_caller_leads() {
    let group: FlushGroup<u64> = FlushGroup::new();

    let (value, shared) = group.run("heartbeats", async { 42 }).await;
    assert_eq!(value, 42);
    assert!(!shared);
    assert_eq!(group.inflight_len(), 0);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_flight() {
    let group: Arc<FlushGroup<u64>> = Arc::new(FlushGroup::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let (gate_tx, gate_rx) = oneshot::channel::<()>();

    let leader = tokio::spawn({
        let group = Arc::clone(&group);
        let calls = Arc::clone(&calls);
        async move {
            group
                .run("heartbeats", async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    gate_rx.await.unwrap();
                    42
                })
                .await
        }
    });

    // wait for the leader to register its flight
    while group.inflight_len() == 0 {
        tokio::task::yield_now().await;
    }

    let mut waiters = JoinSet::new();
    for _ in 0..8 {
        let group = Arc::clone(&group);
        let calls = Arc::clone(&calls);
        waiters.spawn(async move {
            group
                .run("heartbeats", async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    7
                })
                .await
        });
    }
    // let every waiter attach to the in-flight run before releasing it
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
    gate_tx.send(()).unwrap();

    let (value, shared) = leader.await.unwrap();
    assert_eq!(value, 42);
    assert!(!shared);

    while let Some(result) = waiters.join_next().await {
        let (value, shared) = result.unwrap();
        assert_eq!(value, 42, "waiters observe the leader's outcome");
        assert!(shared);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1, "exactly one underlying run");
    assert_eq!(group.inflight_len(), 0);
}

#[tokio::test]
async fn test_distinct_keys_run_independently() {
    let group: Arc<FlushGroup<u64>> = Arc::new(FlushGroup::new());
    let (gate_tx, gate_rx) = oneshot::channel::<()>();

    let blocked = tokio::spawn({
        let group = Arc::clone(&group);
        async move {
            group
                .run("heartbeats", async move {
                    gate_rx.await.unwrap();
                    1
                })
                .await
        }
    });
    while group.inflight_len() == 0 {
        tokio::task::yield_now().await;
    }

    // a different key completes without waiting for the blocked flight
    let (value, shared) = group.run("other", async { 2 }).await;
    assert_eq!(value, 2);
    assert!(!shared);

    gate_tx.send(()).unwrap();
    assert_eq!(blocked.await.unwrap(), (1, false));
}

#[tokio::test]
async fn test_sequential_runs_lead_fresh_flights() {
    let group: FlushGroup<u64> = FlushGroup::new();
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
        let (_, shared) = group
            .run("heartbeats", async {
                calls.fetch_add(1, Ordering::SeqCst);
                0
            })
            .await;
        assert!(!shared);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
