//! Online counts
//!
//! Approximate distinct users per room over the trailing minute.

use chrono::{DateTime, TimeDelta, Utc};

use pulse_store::{HEARTBEATS_TABLE, Store, StoreError, Value};

use crate::MAX_RESULT_ROWS;
use crate::builder::{BoundQuery, QueryBuilder};
use crate::filter::QueryFilter;
use crate::result::OnlineRow;

/// Per-room online user counts over a trailing window.
///
/// Results are ordered by descending count, tie-broken by ascending room
/// id, and capped.
#[derive(Debug, Clone)]
pub struct OnlineCountsQuery {
    window: TimeDelta,
    limit: u32,
}

impl Default for OnlineCountsQuery {
    fn default() -> Self {
        Self {
            window: TimeDelta::minutes(1),
            limit: MAX_RESULT_ROWS,
        }
    }
}

impl OnlineCountsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn build(&self, filter: &QueryFilter, now: DateTime<Utc>) -> BoundQuery {
        let since = now - self.window;
        let qb = QueryBuilder::new(HEARTBEATS_TABLE)
            .select("room_id")
            .select_as("APPROX_COUNT_DISTINCT(user_id)", "onlines")
            .where_bind(
                "created_at >= epoch_ms(?)",
                Value::BigInt(since.timestamp_millis()),
            );
        filter
            .apply(qb)
            .group_by("room_id")
            .order_by_desc("onlines")
            .order_by("room_id")
            .limit(self.limit)
            .build()
    }

    /// Execute against the store, with `now` anchoring the window.
    pub fn execute(
        &self,
        store: &Store,
        filter: &QueryFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<OnlineRow>, StoreError> {
        let query = self.build(filter, now);
        tracing::debug!(sql = %query.sql, "executing onlines query");
        store.query(&query.sql, &query.params, |row| {
            Ok(OnlineRow {
                room_id: row.get(0)?,
                onlines: row.get(1)?,
            })
        })
    }
}
