//! Schema migration
//!
//! One table; timestamps are stored as UTC.

use duckdb::Connection;
use tracing::debug;

use crate::error::{Result, StoreError};

const HEARTBEATS_DDL: &str = "\
CREATE TABLE IF NOT EXISTS heartbeats (
    id         VARCHAR,
    user_id    INTEGER,
    room_id    INTEGER,
    server_id  INTEGER,
    room_type  INTEGER,
    created_at TIMESTAMP
)";

/// Apply the schema. Idempotent.
pub(crate) fn migrate(conn: &Connection) -> Result<()> {
    debug!("migrating heartbeats schema");
    conn.execute_batch(HEARTBEATS_DDL)
        .map_err(|e| StoreError::Migrate(e.to_string()))
}
