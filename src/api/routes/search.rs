//! Search handlers: post search, searchable fields, failed posts.

use super::SearchQuery;
use crate::api::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /api/search - Search posts
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "search",
    params(SearchQuery),
    responses(
        (status = 200, description = "One page of matching posts with their files", body = crate::types::SearchResults),
        (status = 400, description = "Malformed search parameters", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let request = match query.into_request() {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(
        fields = ?request.fields,
        term = %request.term,
        page = request.page,
        page_size = request.page_size,
        "Searching posts"
    );

    match state.orchestrator.search(&request).await {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Search failed");
            e.into_response()
        }
    }
}

/// GET /api/searchable_fields - Fields accepted by /api/search
#[utoipa::path(
    get,
    path = "/api/searchable_fields",
    tag = "search",
    responses(
        (status = 200, description = "Searchable field names", body = Vec<crate::types::SearchField>)
    )
)]
pub async fn searchable_fields(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.orchestrator.searchable_fields().to_vec())
}

/// GET /api/failed_posts - Posts with at least one failed URL
#[utoipa::path(
    get,
    path = "/api/failed_posts",
    tag = "search",
    responses(
        (status = 200, description = "Posts with failed URLs", body = Vec<crate::types::FailedPost>),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn failed_posts(State(state): State<AppState>) -> Response {
    match state.orchestrator.failed_posts().await {
        Ok(posts) => (StatusCode::OK, Json(posts)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list failed posts");
            e.into_response()
        }
    }
}
