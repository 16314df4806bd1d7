//! Append sink
//!
//! The narrow write contract the ingestion pipeline depends on, and its
//! DuckDB implementation.

use duckdb::types::{TimeUnit, Value};
use duckdb::{Connection, params};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::HEARTBEATS_TABLE;
use crate::error::{Result, StoreError};
use crate::event::Heartbeat;

/// Bulk-append target for heartbeat rows.
///
/// `append_row` stages a row cheaply; `flush` is the durability point -
/// data is queryable once it returns Ok. `close` performs a final flush
/// and rejects further appends.
pub trait AppendSink: Send {
    /// Logical sink name, used as the flush deduplication key.
    fn name(&self) -> &str;

    fn append_row(&mut self, hb: &Heartbeat) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

struct StagedRow {
    /// Storage row id, assigned at append time
    id: String,
    hb: Heartbeat,
}

/// DuckDB-backed [`AppendSink`] over the heartbeats table.
///
/// Rows are staged in memory and written through a `duckdb::Appender`
/// scoped to each flush call, so the appender never outlives its
/// connection borrow.
pub struct DuckSink {
    conn: Connection,
    staged: Vec<StagedRow>,
    closed: bool,
}

impl DuckSink {
    pub(crate) fn new(conn: Connection) -> Self {
        Self {
            conn,
            staged: Vec::new(),
            closed: false,
        }
    }

    /// Rows staged but not yet flushed.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }
}

impl AppendSink for DuckSink {
    fn name(&self) -> &str {
        HEARTBEATS_TABLE
    }

    fn append_row(&mut self, hb: &Heartbeat) -> Result<()> {
        if self.closed {
            return Err(StoreError::SinkClosed);
        }
        self.staged.push(StagedRow {
            id: Uuid::new_v4().to_string(),
            hb: hb.clone(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Err(StoreError::SinkClosed);
        }
        if self.staged.is_empty() {
            return Ok(());
        }
        let staged = std::mem::take(&mut self.staged);
        let mut appender = self
            .conn
            .appender(HEARTBEATS_TABLE)
            .map_err(StoreError::flush)?;

        let mut skipped = 0usize;
        for row in &staged {
            let created_at = Value::Timestamp(
                TimeUnit::Microsecond,
                row.hb.created_at.timestamp_micros(),
            );
            let appended = appender.append_row(params![
                row.id,
                row.hb.user_id,
                row.hb.room_id,
                row.hb.server_id,
                row.hb.room_type,
                created_at,
            ]);
            if let Err(e) = appended {
                skipped += 1;
                warn!(error = %e, row_id = %row.id, "dropping row that failed to append");
            }
        }
        appender.flush().map_err(StoreError::flush)?;
        debug!(rows = staged.len() - skipped, skipped, "flushed to duckdb");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.flush();
        self.closed = true;
        result
    }
}
