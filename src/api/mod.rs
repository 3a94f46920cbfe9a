//! REST API server module
//!
//! A thin HTTP transport over [`Orchestrator`]: start jobs, poll status,
//! read statistics, search posts, fetch files and stream live job events.

use crate::{Config, Orchestrator, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Jobs
/// - `PUT /api/download` - Start a download job (409 if one is alive)
/// - `GET /api/status` - Live job progress, or the cached summary when idle
/// - `GET /api/stats` - Cached statistics summary
///
/// ## Search
/// - `GET /api/search` - Paginated post search
/// - `GET /api/searchable_fields` - Fields accepted by search
/// - `GET /api/failed_posts` - Posts with failed URLs
///
/// ## Files
/// - `GET /file?id=<token>` - Download a file by token
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/version` - Running version
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /api/events` - Server-sent events stream of job progress
/// - `POST /api/shutdown` - Operator shutdown
pub fn create_router(orchestrator: Arc<Orchestrator>, config: Arc<Config>) -> Router {
    let state = AppState::new(orchestrator, config.clone());

    let router = Router::new()
        // Jobs
        .route("/api/download", put(routes::start_download))
        .route("/api/status", get(routes::download_status))
        .route("/api/stats", get(routes::get_stats))
        // Search
        .route("/api/search", get(routes::search_posts))
        .route("/api/searchable_fields", get(routes::searchable_fields))
        .route("/api/failed_posts", get(routes::failed_posts))
        // Files
        .route("/file", get(routes::get_file))
        // System
        .route("/api/health", get(routes::health_check))
        .route("/api/version", get(routes::get_version))
        .route("/api/openapi.json", get(routes::openapi_spec))
        .route("/api/events", get(routes::event_stream))
        .route("/api/shutdown", post(routes::shutdown));

    // SwaggerUi serves its own copy of the document under a separate path
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. All methods and headers are permitted.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Serves until the orchestrator's shutdown token is cancelled (for example
/// by `POST /api/shutdown`), then drains in-flight requests and returns.
///
/// # Example
///
/// ```no_run
/// use rmd_orchestrator::{Config, Orchestrator};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let orchestrator = Arc::new(Orchestrator::new((*config).clone()).await?);
///
/// // Blocks until shutdown
/// rmd_orchestrator::api::start_api_server(orchestrator, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(orchestrator: Arc<Orchestrator>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, orchestrator, config).await
}

/// Serve the API on an already-bound listener
///
/// Useful when binding to port 0 and reading the assigned address first.
pub async fn serve(
    listener: TcpListener,
    orchestrator: Arc<Orchestrator>,
    config: Arc<Config>,
) -> Result<()> {
    let address = listener.local_addr().map_err(crate::error::Error::Io)?;
    let shutdown = orchestrator.shutdown_token();
    let app = create_router(orchestrator, config);

    tracing::info!(address = %address, "API server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
