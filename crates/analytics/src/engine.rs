//! Analytics engine
//!
//! Bundles the store handle with the aggregate queries.

use chrono::Utc;

use pulse_store::{Store, StoreError};

use crate::filter::QueryFilter;
use crate::onlines::OnlineCountsQuery;
use crate::result::{OnlineRow, RetentionRow};
use crate::retention::MinuteRetentionQuery;

/// Read-side engine over the heartbeats store.
///
/// Cheap to clone; queries are safe to run concurrently with the write
/// path.
#[derive(Clone)]
pub struct AnalyticsEngine {
    store: Store,
    onlines: OnlineCountsQuery,
    retention: MinuteRetentionQuery,
}

impl AnalyticsEngine {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            onlines: OnlineCountsQuery::new(),
            retention: MinuteRetentionQuery::new(),
        }
    }

    /// Current online users per room over the trailing minute.
    pub fn onlines(&self, filter: &QueryFilter) -> Result<Vec<OnlineRow>, StoreError> {
        self.onlines.execute(&self.store, filter, Utc::now())
    }

    /// Retention for the most recently completed minute.
    pub fn retention(&self, filter: &QueryFilter) -> Result<Vec<RetentionRow>, StoreError> {
        self.retention.execute(&self.store, filter, Utc::now())
    }
}
