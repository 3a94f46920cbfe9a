//! Job handlers: start, status, statistics.

use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// PUT /api/download - Start a download job
#[utoipa::path(
    put,
    path = "/api/download",
    tag = "jobs",
    responses(
        (status = 202, description = "Download job started"),
        (status = 409, description = "A download job is already running", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn start_download(State(state): State<AppState>) -> Response {
    match state.orchestrator.start_job().await {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({"started": true}))).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Download job not started");
            e.into_response()
        }
    }
}

/// GET /api/status - Live job progress, or the cached summary when idle
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "jobs",
    responses(
        (status = 200, description = "Job progress snapshot, or {running: false, summary} when no job is alive"),
        (status = 500, description = "Statistics could not be computed", body = crate::error::ApiError)
    )
)]
pub async fn download_status(State(state): State<AppState>) -> Response {
    match state.orchestrator.get_status().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build status report");
            e.into_response()
        }
    }
}

/// GET /api/stats - Cached record store summary
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "jobs",
    responses(
        (status = 200, description = "Statistics summary", body = crate::types::StatsSummary),
        (status = 500, description = "Statistics could not be computed", body = crate::error::ApiError)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Response {
    match state.orchestrator.get_cached_stats().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to compute statistics");
            e.into_response()
        }
    }
}
