//! Store error types

use thiserror::Error;

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or create the database
    #[error("failed to open store at {path}: {message}")]
    Open { path: String, message: String },

    /// Schema migration failed
    #[error("schema migration failed: {0}")]
    Migrate(String),

    /// Single-row append failed
    #[error("row append failed: {0}")]
    Append(String),

    /// Batch-level flush failed
    #[error("flush failed: {0}")]
    Flush(String),

    /// Store read failed
    #[error("query failed: {0}")]
    Query(#[from] duckdb::Error),

    /// Append handle was closed
    #[error("append sink is closed")]
    SinkClosed,

    /// I/O error (data directory creation)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create an append error
    pub fn append(msg: impl ToString) -> Self {
        Self::Append(msg.to_string())
    }

    /// Create a flush error
    pub fn flush(msg: impl ToString) -> Self {
        Self::Flush(msg.to_string())
    }
}
