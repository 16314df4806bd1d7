//! Shared helpers for pipeline tests

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;

use pulse_store::{AppendSink, Heartbeat, StoreError};

pub(crate) fn hb(user_id: i32) -> Heartbeat {
    Heartbeat::new(user_id, 1000, 1, 1, Utc::now())
}

/// Observable state behind a [`MockSink`]
#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub rows: Mutex<Vec<Heartbeat>>,
    pub flush_calls: AtomicUsize,
    pub fail_flush: AtomicBool,
    pub closed: AtomicBool,
}

impl MockState {
    pub fn row_users(&self) -> Vec<i32> {
        self.rows.lock().unwrap().iter().map(|hb| hb.user_id).collect()
    }

    pub fn flush_calls(&self) -> usize {
        self.flush_calls.load(Ordering::SeqCst)
    }
}

/// In-memory sink with switchable failure modes
pub(crate) struct MockSink {
    pub state: Arc<MockState>,
    /// Appends for this user id fail (single-row failure injection)
    pub fail_append_user: Option<i32>,
}

impl MockSink {
    pub fn new() -> (Self, Arc<MockState>) {
        let state = Arc::new(MockState::default());
        (
            Self {
                state: Arc::clone(&state),
                fail_append_user: None,
            },
            state,
        )
    }
}

impl AppendSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    fn append_row(&mut self, hb: &Heartbeat) -> Result<(), StoreError> {
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(StoreError::SinkClosed);
        }
        if self.fail_append_user == Some(hb.user_id) {
            return Err(StoreError::append("synthetic append failure"));
        }
        self.state.rows.lock().unwrap().push(hb.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.state.flush_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_flush.load(Ordering::SeqCst) {
            return Err(StoreError::flush("synthetic flush failure"));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        let result = self.flush();
        self.state.closed.store(true, Ordering::SeqCst);
        result
    }
}
