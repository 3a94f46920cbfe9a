//! System handlers: health, version, OpenAPI, events, shutdown.

use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// GET /api/health - Health check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /api/version - Running version
#[utoipa::path(
    get,
    path = "/api/version",
    tag = "system",
    responses(
        (status = 200, description = "Current version as {current_version}")
    )
)]
pub async fn get_version() -> impl IntoResponse {
    Json(json!({ "current_version": env!("CARGO_PKG_VERSION") }))
}

/// GET /api/openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/api/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3.1 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// GET /api/events - Server-sent stream of relayed job events
///
/// Each job event is sent as a `progress` event carrying the payload
/// unchanged. Nothing emitted before the client connected is replayed.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "system",
    responses(
        (status = 200, description = "Server-sent events stream (text/event-stream)", content_type = "text/event-stream")
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = state.orchestrator.subscribe();
    let stream = BroadcastStream::new(receiver);

    let sse_stream = stream.filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(event.payload()) {
            Ok(json_data) => Some(Ok(SseEvent::default().event("progress").data(json_data))),
            Err(e) => {
                tracing::warn!("Failed to serialize event to JSON: {}", e);
                None
            }
        },
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("SSE client lagged, skipped {} events", skipped);
            Some(Ok(SseEvent::default().event("error").data(format!(
                r#"{{"error":"lagged","skipped":{}}}"#,
                skipped
            ))))
        }
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}

/// POST /api/shutdown - Operator-issued shutdown
#[utoipa::path(
    post,
    path = "/api/shutdown",
    tag = "system",
    responses(
        (status = 202, description = "Shutdown initiated")
    )
)]
pub async fn shutdown(State(state): State<AppState>) -> impl IntoResponse {
    // Let the response go out before the server starts draining
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        if let Err(e) = state.orchestrator.shutdown().await {
            tracing::error!(error = %e, "Error during shutdown");
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({"status": "shutdown initiated"})),
    )
}
