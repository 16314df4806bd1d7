//! Aggregate query result types

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Approximate distinct-user count for one room over the trailing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OnlineRow {
    pub room_id: i32,
    pub onlines: i64,
}

/// One room's retention cohort for a single minute bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionRow {
    pub room_id: i32,
    #[serde(serialize_with = "serialize_minute")]
    pub minute: DateTime<Utc>,
    pub total_users: i64,
    pub retained_users: i64,
    /// `round(retained / total * 100, 1)`, always within `[0, 100]`
    pub retention_ratio: f64,
}

fn serialize_minute<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.format("%Y-%m-%d %H:%M:%S").to_string())
}
