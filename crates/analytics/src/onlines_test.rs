//! Execution tests for online counts, against an in-memory store
//!
//! Fixtures are small, where approximate distinct counts behave exactly.

use chrono::{DateTime, TimeDelta, Utc};

use pulse_store::{AppendSink, Heartbeat, Store};

use crate::filter::QueryFilter;
use crate::onlines::OnlineCountsQuery;

fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_559_445, 0).unwrap()
}

fn seed(store: &Store, rows: &[(i32, i32, i32, i32, DateTime<Utc>)]) {
    let mut sink = store.appender().unwrap();
    for &(user_id, room_id, room_type, server_id, created_at) in rows {
        sink.append_row(&Heartbeat::new(
            user_id, room_id, room_type, server_id, created_at,
        ))
        .unwrap();
    }
    sink.flush().unwrap();
}

#[test]
fn test_counts_distinct_users_per_room() {
    let store = Store::open_in_memory().unwrap();
    let now = fixed_now();
    seed(
        &store,
        &[
            // room 1000: two users, one of them heartbeating twice
            (1, 1000, 1, 1, now),
            (1, 1000, 1, 1, now - TimeDelta::seconds(10)),
            (2, 1000, 1, 1, now - TimeDelta::seconds(30)),
            // room 1001: one user
            (3, 1001, 1, 1, now),
        ],
    );

    let rows = OnlineCountsQuery::new()
        .execute(&store, &QueryFilter::new(), now)
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].room_id, rows[0].onlines), (1000, 2));
    assert_eq!((rows[1].room_id, rows[1].onlines), (1001, 1));
}

#[test]
fn test_events_outside_window_excluded() {
    let store = Store::open_in_memory().unwrap();
    let now = fixed_now();
    seed(
        &store,
        &[
            (1, 1000, 1, 1, now - TimeDelta::seconds(30)),
            (2, 1000, 1, 1, now - TimeDelta::minutes(2)),
        ],
    );

    let rows = OnlineCountsQuery::new()
        .execute(&store, &QueryFilter::new(), now)
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].onlines, 1);
}

#[test]
fn test_filters_constrain_only_when_present() {
    let store = Store::open_in_memory().unwrap();
    let now = fixed_now();
    seed(
        &store,
        &[
            (1, 1000, 1, 1, now),
            (2, 1000, 2, 1, now),
            (3, 1001, 1, 2, now),
        ],
    );

    let all = OnlineCountsQuery::new()
        .execute(&store, &QueryFilter::new(), now)
        .unwrap();
    assert_eq!(all.iter().map(|r| r.onlines).sum::<i64>(), 3);

    let server_one = OnlineCountsQuery::new()
        .execute(&store, &QueryFilter::new().with_server_id(1), now)
        .unwrap();
    assert_eq!(server_one.len(), 1);
    assert_eq!((server_one[0].room_id, server_one[0].onlines), (1000, 2));

    let narrow = OnlineCountsQuery::new()
        .execute(
            &store,
            &QueryFilter::new().with_server_id(1).with_room_type(2),
            now,
        )
        .unwrap();
    assert_eq!(narrow.len(), 1);
    assert_eq!(narrow[0].onlines, 1);
}

#[test]
fn test_ordering_count_desc_then_room_asc() {
    let store = Store::open_in_memory().unwrap();
    let now = fixed_now();
    seed(
        &store,
        &[
            (1, 1002, 1, 1, now),
            (2, 1000, 1, 1, now),
            (3, 1001, 1, 1, now),
            (4, 1001, 1, 1, now),
        ],
    );

    let rows = OnlineCountsQuery::new()
        .execute(&store, &QueryFilter::new(), now)
        .unwrap();

    let order: Vec<(i32, i64)> = rows.iter().map(|r| (r.room_id, r.onlines)).collect();
    assert_eq!(order, vec![(1001, 2), (1000, 1), (1002, 1)]);
}

#[test]
fn test_result_set_capped_at_500_rooms() {
    let store = Store::open_in_memory().unwrap();
    let now = fixed_now();
    let rows: Vec<(i32, i32, i32, i32, DateTime<Utc>)> = (0..510)
        .map(|i| (i, 2000 + i, 1, 1, now))
        .collect();
    seed(&store, &rows);

    let results = OnlineCountsQuery::new()
        .execute(&store, &QueryFilter::new(), now)
        .unwrap();
    assert_eq!(results.len(), 500);
}
