//! Heartbeat event type

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single presence heartbeat: a user pinging a room on a server.
///
/// Immutable once created. The storage row id is assigned by the sink at
/// append time, not carried on the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heartbeat {
    pub user_id: i32,
    pub room_id: i32,
    pub room_type: i32,
    pub server_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Heartbeat {
    pub fn new(
        user_id: i32,
        room_id: i32,
        room_type: i32,
        server_id: i32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            room_id,
            room_type,
            server_id,
            created_at,
        }
    }
}
