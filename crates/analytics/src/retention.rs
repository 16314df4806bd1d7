//! Minute retention
//!
//! Per-room user cohorts bucketed by minute and tracked into the
//! following minute. The query targets the most recently completed
//! minute over a trailing source window of raw events.

use chrono::{DateTime, TimeDelta, Utc};

use pulse_store::{Store, StoreError, Value};

use crate::MAX_RESULT_ROWS;
use crate::builder::BoundQuery;
use crate::filter::QueryFilter;
use crate::result::RetentionRow;

/// Minute-level retention per room.
///
/// `total_users` and `retained_users` are approximate distinct counts;
/// `retention_ratio` is `round(retained / total * 100, 1)`, defined as
/// 0.0 when a bucket has no users and clamped to 100 so estimate error
/// on the join side cannot push it above the bound.
#[derive(Debug, Clone)]
pub struct MinuteRetentionQuery {
    lookback: TimeDelta,
    limit: u32,
}

impl Default for MinuteRetentionQuery {
    fn default() -> Self {
        Self {
            lookback: TimeDelta::days(3),
            limit: MAX_RESULT_ROWS,
        }
    }
}

impl MinuteRetentionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// The minute bucket the query reports on: the most recently
    /// completed minute relative to `now`.
    pub fn target_minute(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        truncate_minute(now) - TimeDelta::minutes(1)
    }

    pub(crate) fn build(&self, filter: &QueryFilter, now: DateTime<Utc>) -> BoundQuery {
        let start = truncate_minute(now - self.lookback);
        let end = truncate_minute(now);

        // Fixed skeleton; only the optional predicate fragments vary, and
        // every value is bound.
        let mut source_where = String::from("created_at BETWEEN epoch_ms(?) AND epoch_ms(?)");
        let mut params = vec![
            Value::BigInt(start.timestamp_millis()),
            Value::BigInt(end.timestamp_millis()),
        ];
        filter.push_predicates(&mut source_where, &mut params);

        let sql = format!(
            "WITH alive_users AS (\n\
             \x20   SELECT user_id, room_id, date_trunc('minute', created_at) AS minute\n\
             \x20   FROM heartbeats\n\
             \x20   WHERE {source_where}\n\
             \x20   GROUP BY user_id, room_id, date_trunc('minute', created_at)\n\
             ),\n\
             minute_retention AS (\n\
             \x20   SELECT\n\
             \x20       a.room_id,\n\
             \x20       a.minute,\n\
             \x20       APPROX_COUNT_DISTINCT(a.user_id) AS total_users,\n\
             \x20       APPROX_COUNT_DISTINCT(b.user_id) AS retained_users,\n\
             \x20       round(CASE WHEN APPROX_COUNT_DISTINCT(a.user_id) = 0 THEN 0.0\n\
             \x20             ELSE LEAST(APPROX_COUNT_DISTINCT(b.user_id) * 100.0\n\
             \x20                        / APPROX_COUNT_DISTINCT(a.user_id), 100.0)\n\
             \x20             END, 1) AS retention_ratio\n\
             \x20   FROM alive_users a\n\
             \x20   LEFT JOIN alive_users b\n\
             \x20       ON a.user_id = b.user_id\n\
             \x20       AND a.room_id = b.room_id\n\
             \x20       AND b.minute = a.minute + INTERVAL 1 MINUTE\n\
             \x20   GROUP BY a.room_id, a.minute\n\
             )\n\
             SELECT room_id, epoch_ms(minute) AS minute_ms, total_users, retained_users, retention_ratio\n\
             FROM minute_retention\n\
             WHERE minute = epoch_ms(?)\n\
             ORDER BY retention_ratio DESC, retained_users DESC, room_id ASC\n\
             LIMIT {limit}",
            limit = self.limit,
        );
        params.push(Value::BigInt(self.target_minute(now).timestamp_millis()));

        BoundQuery { sql, params }
    }

    /// Execute against the store, with `now` anchoring the window and
    /// target minute.
    pub fn execute(
        &self,
        store: &Store,
        filter: &QueryFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<RetentionRow>, StoreError> {
        let query = self.build(filter, now);
        tracing::debug!(sql = %query.sql, "executing retention query");
        let rows = store.query(&query.sql, &query.params, |row| {
            Ok((
                row.get::<_, i32>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, f64>(4)?,
            ))
        })?;
        Ok(rows
            .into_iter()
            .map(
                |(room_id, minute_ms, total_users, retained_users, retention_ratio)| RetentionRow {
                    room_id,
                    // minute_ms came from epoch_ms() of a stored timestamp
                    minute: DateTime::from_timestamp_millis(minute_ms)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                    total_users,
                    retained_users,
                    retention_ratio,
                },
            )
            .collect())
    }
}

/// Truncate a timestamp to the start of its minute.
pub(crate) fn truncate_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t - TimeDelta::milliseconds(t.timestamp_millis().rem_euclid(60_000))
}
