//! Tests for query construction

use chrono::{DateTime, Utc};

use pulse_store::Value;

use crate::builder::QueryBuilder;
use crate::filter::QueryFilter;
use crate::onlines::OnlineCountsQuery;
use crate::retention::{MinuteRetentionQuery, truncate_minute};

fn fixed_now() -> DateTime<Utc> {
    // 2024-05-01 10:30:45 UTC
    DateTime::from_timestamp(1_714_559_445, 0).unwrap()
}

#[test]
fn test_basic_select() {
    let query = QueryBuilder::new("heartbeats")
        .select("room_id")
        .select("user_id")
        .build();

    assert_eq!(query.sql, "SELECT room_id, user_id FROM heartbeats");
    assert!(query.params.is_empty());
}

#[test]
fn test_select_with_alias() {
    let query = QueryBuilder::new("heartbeats")
        .select_as("count(*)", "total")
        .build();

    assert_eq!(query.sql, "SELECT count(*) AS total FROM heartbeats");
}

#[test]
fn test_where_bind_collects_params_in_order() {
    let query = QueryBuilder::new("heartbeats")
        .select("room_id")
        .where_bind("server_id = ?", Value::Int(3))
        .where_bind("room_type = ?", Value::Int(7))
        .build();

    assert!(query.sql.contains("WHERE server_id = ? AND room_type = ?"));
    assert_eq!(query.params, vec![Value::Int(3), Value::Int(7)]);
}

#[test]
fn test_group_order_limit() {
    let query = QueryBuilder::new("heartbeats")
        .select("room_id")
        .select_as("count(*)", "n")
        .group_by("room_id")
        .order_by_desc("n")
        .order_by("room_id")
        .limit(10)
        .build();

    assert!(query.sql.contains("GROUP BY room_id"));
    assert!(query.sql.contains("ORDER BY n DESC, room_id"));
    assert!(query.sql.ends_with("LIMIT 10"));
}

#[test]
fn test_onlines_query_shape() {
    let query = OnlineCountsQuery::new().build(&QueryFilter::new(), fixed_now());

    assert!(
        query
            .sql
            .contains("APPROX_COUNT_DISTINCT(user_id) AS onlines")
    );
    assert!(query.sql.contains("created_at >= epoch_ms(?)"));
    assert!(query.sql.contains("ORDER BY onlines DESC, room_id"));
    assert!(query.sql.ends_with("LIMIT 500"));
    // no filters: only the window bound
    assert_eq!(query.params.len(), 1);
    assert!(!query.sql.contains("server_id"));
    assert!(!query.sql.contains("room_type"));
}

#[test]
fn test_onlines_query_with_filters() {
    let filter = QueryFilter::new().with_server_id(3).with_room_type(7);
    let query = OnlineCountsQuery::new().build(&filter, fixed_now());

    assert!(query.sql.contains("server_id = ?"));
    assert!(query.sql.contains("room_type = ?"));
    assert_eq!(
        query.params[1..],
        [Value::Int(3), Value::Int(7)],
        "filter values are bound, in clause order"
    );
}

#[test]
fn test_onlines_window_is_one_minute() {
    let query = OnlineCountsQuery::new().build(&QueryFilter::new(), fixed_now());

    let Value::BigInt(since_ms) = query.params[0] else {
        panic!("window bound should be a bigint");
    };
    assert_eq!(since_ms, fixed_now().timestamp_millis() - 60_000);
}

#[test]
fn test_retention_query_shape() {
    let query = MinuteRetentionQuery::new().build(&QueryFilter::new(), fixed_now());

    assert!(query.sql.contains("WITH alive_users AS"));
    assert!(query.sql.contains("created_at BETWEEN epoch_ms(?) AND epoch_ms(?)"));
    assert!(query.sql.contains("b.minute = a.minute + INTERVAL 1 MINUTE"));
    assert!(
        query
            .sql
            .contains("ORDER BY retention_ratio DESC, retained_users DESC, room_id ASC")
    );
    assert!(query.sql.ends_with("LIMIT 500"));
    // source window bounds + target minute
    assert_eq!(query.params.len(), 3);
}

#[test]
fn test_retention_query_binds_filters_between_window_and_target() {
    let filter = QueryFilter::new().with_server_id(3).with_room_type(7);
    let query = MinuteRetentionQuery::new().build(&filter, fixed_now());

    assert_eq!(query.params.len(), 5);
    assert_eq!(query.params[2], Value::Int(3));
    assert_eq!(query.params[3], Value::Int(7));

    let target = MinuteRetentionQuery::new().target_minute(fixed_now());
    assert_eq!(
        query.params[4],
        Value::BigInt(target.timestamp_millis()),
        "target minute is the last bound value"
    );
}

#[test]
fn test_retention_target_is_last_completed_minute() {
    // 10:30:45 -> target bucket 10:29:00
    let target = MinuteRetentionQuery::new().target_minute(fixed_now());
    assert_eq!(target.timestamp(), 1_714_559_340);
}

#[test]
fn test_truncate_minute() {
    let t = DateTime::from_timestamp(1_714_559_445, 123_000_000).unwrap();
    let truncated = truncate_minute(t);
    assert_eq!(truncated.timestamp(), 1_714_559_400);
    assert_eq!(truncated.timestamp_subsec_millis(), 0);
    // already-truncated values are unchanged
    assert_eq!(truncate_minute(truncated), truncated);
}

#[test]
fn test_no_user_value_is_interpolated() {
    let filter = QueryFilter::new().with_server_id(1234567).with_room_type(7654321);
    let onlines = OnlineCountsQuery::new().build(&filter, fixed_now());
    let retention = MinuteRetentionQuery::new().build(&filter, fixed_now());

    assert!(!onlines.sql.contains("1234567"));
    assert!(!onlines.sql.contains("7654321"));
    assert!(!retention.sql.contains("1234567"));
    assert!(!retention.sql.contains("7654321"));
}
