//! API request and response types

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use pulse_store::Heartbeat;

use crate::error::ApiError;

/// Body of `POST /api/write`
#[derive(Debug, Clone, Deserialize)]
pub struct WriteRequest {
    pub user_id: i32,
    pub room_id: i32,
    pub room_type: i32,
    pub server_id: i32,
    /// Event time as milliseconds since the Unix epoch
    pub created_at: i64,
}

impl WriteRequest {
    /// Validate and convert into a heartbeat event.
    pub fn into_heartbeat(self) -> Result<Heartbeat, ApiError> {
        let created_at =
            DateTime::from_timestamp_millis(self.created_at).ok_or(ApiError::Validation {
                field: "created_at",
                message: format!("{} is not a valid millisecond timestamp", self.created_at),
            })?;
        Ok(Heartbeat::new(
            self.user_id,
            self.room_id,
            self.room_type,
            self.server_id,
            created_at,
        ))
    }
}

/// Status body inside the write/error envelope
#[derive(Debug, Serialize)]
pub struct Status {
    pub code: i32,
    pub message: String,
}

/// The `{"error":{"code":..,"message":..}}` envelope; code 0 means ok
#[derive(Debug, Serialize)]
pub struct StatusEnvelope {
    pub error: Status,
}

impl StatusEnvelope {
    pub fn ok() -> Self {
        Self {
            error: Status {
                code: 0,
                message: "ok".into(),
            },
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            error: Status {
                code,
                message: message.into(),
            },
        }
    }
}

/// Body of `GET /api/rows`
#[derive(Debug, Serialize)]
pub struct RowCountResponse {
    pub count: i64,
}

/// Body of `POST /api/cleanup`: an empty object
#[derive(Debug, Serialize)]
pub struct CleanupResponse {}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
