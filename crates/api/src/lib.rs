//! Pulse - HTTP API
//!
//! Axum routes for heartbeat ingestion and aggregate queries.
//!
//! # Endpoints
//!
//! - `POST /api/write` - enqueue one heartbeat event
//! - `POST /api/cleanup` - delete expired rows and checkpoint the store
//! - `GET /api/query/onlines` - online users per room (trailing minute)
//! - `GET /api/query/retention` - minute retention per room
//! - `GET /api/rows` - total stored row count (diagnostic)
//! - `GET /health` - health check
//!
//! # Usage
//!
//! ```ignore
//! use pulse_api::{AppState, build_router};
//!
//! let state = AppState::new(pipeline.handle(), engine, store, retention);
//! let app = build_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:7070").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! The write endpoint acknowledges the enqueue step only; appends and
//! flushes happen asynchronously and their failures are logged, not
//! surfaced to the writer. Query failures surface as 5xx envelopes.

mod error;
mod routes;
mod state;
mod types;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
pub use types::{RowCountResponse, StatusEnvelope, WriteRequest};
