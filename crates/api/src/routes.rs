//! HTTP route handlers

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tracing::{debug, info};

use pulse_analytics::{OnlineRow, QueryFilter, RetentionRow};
use pulse_store::StoreError;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{
    CleanupResponse, HealthResponse, RowCountResponse, StatusEnvelope, WriteRequest,
};

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/write", post(write))
        .route("/api/cleanup", post(cleanup))
        .route("/api/query/onlines", get(query_onlines))
        .route("/api/query/retention", get(query_retention))
        .route("/api/rows", get(rows))
        .with_state(state)
}

/// POST /api/write - enqueue one heartbeat
///
/// Acknowledges the enqueue step only; the append and flush happen
/// asynchronously.
async fn write(
    State(state): State<AppState>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<StatusEnvelope>, ApiError> {
    let hb = req.into_heartbeat()?;
    state.ingest.enqueue(hb)?;
    Ok(Json(StatusEnvelope::ok()))
}

/// POST /api/cleanup - delete expired rows and checkpoint
async fn cleanup(State(state): State<AppState>) -> Result<Json<CleanupResponse>, ApiError> {
    let store = state.store.clone();
    let cutoff = Utc::now() - state.cleanup_retention;
    let deleted = tokio::task::spawn_blocking(move || {
        let deleted = store.delete_older_than(cutoff)?;
        store.checkpoint()?;
        Ok::<usize, StoreError>(deleted)
    })
    .await
    .map_err(ApiError::internal)??;

    info!(deleted, "cleanup completed");
    Ok(Json(CleanupResponse {}))
}

/// GET /api/query/onlines - online users per room
async fn query_onlines(
    State(state): State<AppState>,
    Query(filter): Query<QueryFilter>,
) -> Result<Json<Vec<OnlineRow>>, ApiError> {
    debug!(?filter, "onlines query");
    let engine = state.engine.clone();
    let rows = tokio::task::spawn_blocking(move || engine.onlines(&filter))
        .await
        .map_err(ApiError::internal)??;
    Ok(Json(rows))
}

/// GET /api/query/retention - minute retention per room
async fn query_retention(
    State(state): State<AppState>,
    Query(filter): Query<QueryFilter>,
) -> Result<Json<Vec<RetentionRow>>, ApiError> {
    debug!(?filter, "retention query");
    let engine = state.engine.clone();
    let rows = tokio::task::spawn_blocking(move || engine.retention(&filter))
        .await
        .map_err(ApiError::internal)??;
    Ok(Json(rows))
}

/// GET /api/rows - total stored row count
async fn rows(State(state): State<AppState>) -> Result<Json<RowCountResponse>, ApiError> {
    let store = state.store.clone();
    let count = tokio::task::spawn_blocking(move || store.row_count())
        .await
        .map_err(ApiError::internal)??;
    Ok(Json(RowCountResponse { count }))
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
