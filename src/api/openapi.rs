//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the rmd-orchestrator
//! REST API using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the rmd-orchestrator REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "rmd-orchestrator REST API",
        version = "0.1.0",
        description = "Start download jobs, watch their progress, read cached statistics and search downloaded posts",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:7505", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::start_download,
        crate::api::routes::download_status,
        crate::api::routes::get_stats,

        // Search
        crate::api::routes::search_posts,
        crate::api::routes::searchable_fields,
        crate::api::routes::failed_posts,

        // Files
        crate::api::routes::get_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::get_version,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
        crate::api::routes::shutdown,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::FileId,
        crate::types::PostKind,
        crate::types::StatsSummary,
        crate::types::SearchField,
        crate::types::SearchRequest,
        crate::types::FileRef,
        crate::types::PostResult,
        crate::types::SearchResults,
        crate::types::FailedPost,

        // Job progress
        crate::job::ProgressSnapshot,

        // API request types from routes
        crate::api::routes::SearchQuery,
        crate::api::routes::FileQuery,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Download jobs - Start a job, poll its status, read cached statistics"),
        (name = "search", description = "Search - Find downloaded posts and inspect failures"),
        (name = "files", description = "Files - Fetch downloaded files by token"),
        (name = "system", description = "System endpoints - Health checks, version, OpenAPI spec, events, shutdown"),
    )
)]
pub struct ApiDoc;
