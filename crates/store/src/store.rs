//! Store handle
//!
//! Connection management, parameterized query execution, and maintenance
//! operations (row count, retention delete, checkpoint).

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use duckdb::types::Value;
use duckdb::{Connection, Row, params_from_iter};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::schema;
use crate::sink::DuckSink;

const DB_FILE: &str = "pulse.db";

/// Handle to the DuckDB store.
///
/// Cheap to clone; all clones share one read/maintenance connection.
/// Write traffic goes through [`Store::appender`], which opens its own
/// connection to the same database so the writer never holds the read
/// lock.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database under `data_dir` and apply the schema.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let db_file = data_dir.join(DB_FILE);
        let conn = Connection::open(&db_file).map_err(|e| StoreError::Open {
            path: db_file.display().to_string(),
            message: e.to_string(),
        })?;
        schema::migrate(&conn)?;
        info!(db_file = %db_file.display(), "opened duckdb store");
        Ok(Self::from_conn(conn))
    }

    /// Open an in-memory database. Used by tests and the query CLI.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open {
            path: ":memory:".into(),
            message: e.to_string(),
        })?;
        schema::migrate(&conn)?;
        Ok(Self::from_conn(conn))
    }

    fn from_conn(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Create an append handle on its own connection to this database.
    pub fn appender(&self) -> Result<DuckSink> {
        let conn = self.lock().try_clone()?;
        Ok(DuckSink::new(conn))
    }

    /// Run a parameterized SELECT, mapping each result row.
    pub fn query<T, F>(&self, sql: &str, params: &[Value], f: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> duckdb::Result<T>,
    {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), f)?;
        rows.collect::<duckdb::Result<Vec<T>>>()
            .map_err(StoreError::Query)
    }

    /// Run a parameterized statement, returning the affected row count.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let conn = self.lock();
        conn.execute(sql, params_from_iter(params.iter()))
            .map_err(StoreError::Query)
    }

    /// Total rows in the heartbeats table.
    pub fn row_count(&self) -> Result<i64> {
        let counts = self.query("SELECT count(*) FROM heartbeats", &[], |row| row.get(0))?;
        Ok(counts.into_iter().next().unwrap_or(0))
    }

    /// Delete rows older than `cutoff`, returning how many were removed.
    pub fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let deleted = self.execute(
            "DELETE FROM heartbeats WHERE created_at < epoch_ms(?)",
            &[Value::BigInt(cutoff.timestamp_millis())],
        )?;
        debug!(deleted, cutoff = %cutoff, "deleted expired heartbeats");
        Ok(deleted)
    }

    /// Force a database checkpoint.
    pub fn checkpoint(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch("CHECKPOINT").map_err(StoreError::Query)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means a reader panicked mid-query; the
        // connection itself is still usable.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
