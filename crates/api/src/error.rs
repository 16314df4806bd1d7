//! API error types
//!
//! Structured error responses sharing the write endpoint's
//! `{"error":{"code":..,"message":..}}` envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use pulse_ingest::IngestError;
use pulse_store::StoreError;

use crate::types::StatusEnvelope;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range request field
    #[error("validation error: {field} - {message}")]
    Validation { field: &'static str, message: String },

    /// Ingestion backpressure; the caller may retry
    #[error("ingest queue full, retry later")]
    QueueFull,

    /// The service is shutting down
    #[error("service unavailable")]
    Unavailable,

    /// Store read failed
    #[error("query failed: {0}")]
    Query(#[from] StoreError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::QueueFull => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl ToString) -> Self {
        Self::Internal(msg.to_string())
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::QueueFull => Self::QueueFull,
            IngestError::Closed => Self::Unavailable,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = StatusEnvelope::error(status.as_u16() as i32, self.to_string());
        (status, Json(body)).into_response()
    }
}
