//! Flush deduplication
//!
//! A single-flight group keyed by sink name: the first caller for a key
//! runs the operation, concurrent callers for the same key await that
//! run's result instead of starting their own. The entry is removed once
//! the leader completes, so later callers start a fresh flight.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::Notify;

/// Deduplicates concurrent operations per key.
///
/// The leader future must be polled to completion; the flush coordinator
/// never drops it mid-run.
#[derive(Debug, Default)]
pub struct FlushGroup<T> {
    inflight: Mutex<HashMap<String, Arc<Flight<T>>>>,
}

#[derive(Debug)]
struct Flight<T> {
    done: Notify,
    result: OnceLock<T>,
}

impl<T: Clone> FlushGroup<T> {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Run `op` for `key`, or wait for the in-flight run of the same key.
    ///
    /// Returns the result and whether this caller shared another caller's
    /// flight instead of leading its own.
    pub async fn run<F>(&self, key: &str, op: F) -> (T, bool)
    where
        F: Future<Output = T>,
    {
        let existing = {
            let mut inflight = self.lock();
            match inflight.get(key) {
                Some(flight) => Some(Arc::clone(flight)),
                None => {
                    inflight.insert(
                        key.to_string(),
                        Arc::new(Flight {
                            done: Notify::new(),
                            result: OnceLock::new(),
                        }),
                    );
                    None
                }
            }
        };

        if let Some(flight) = existing {
            return (flight.wait().await, true);
        }

        let value = op.await;

        // Remove before publishing so callers arriving from here on lead a
        // new flight; existing waiters still hold the Arc.
        let flight = self.lock().remove(key);
        if let Some(flight) = flight {
            let _ = flight.result.set(value.clone());
            flight.done.notify_waiters();
        }
        (value, false)
    }

    /// Number of keys with an operation in flight.
    pub fn inflight_len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Flight<T>>>> {
        self.inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> Flight<T> {
    async fn wait(&self) -> T {
        loop {
            if let Some(value) = self.result.get() {
                return value.clone();
            }
            let notified = self.done.notified();
            tokio::pin!(notified);
            // Register for a wakeup before re-checking, so a publish
            // between the check and the await cannot be missed.
            notified.as_mut().enable();
            if let Some(value) = self.result.get() {
                return value.clone();
            }
            notified.await;
        }
    }
}
