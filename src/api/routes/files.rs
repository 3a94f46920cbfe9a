//! File handler: serve a downloaded file by token.

use super::FileQuery;
use crate::api::AppState;
use crate::error::Error;
use crate::types::FileId;
use axum::{
    body::Body,
    extract::{Query, Request, State},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// GET /file?id=<token> - Download a file
#[utoipa::path(
    get,
    path = "/file",
    tag = "files",
    params(FileQuery),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "Missing or non-numeric token", body = crate::error::ApiError),
        (status = 403, description = "Stored path escapes the output root", body = crate::error::ApiError),
        (status = 404, description = "Unknown token or file missing on disk", body = crate::error::ApiError)
    )
)]
pub async fn get_file(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
    request: Request,
) -> Response {
    let token = match query.id.as_deref().map(str::parse::<FileId>) {
        Some(Ok(token)) => token,
        Some(Err(_)) | None => {
            return Error::MalformedRequest("id must be a file token".into()).into_response();
        }
    };

    let path = match state.orchestrator.resolve_file(token).await {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(token = %token, error = %e, "File lookup refused");
            return e.into_response();
        }
    };

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}
