use super::*;
use crate::orchestrator::test_helpers::{MockFactory, create_test_orchestrator};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;


/// Router over a test orchestrator (no background relay)
async fn create_test_app() -> (Router, Arc<Orchestrator>, Arc<MockFactory>, tempfile::TempDir) {
    let (orchestrator, factory, temp_dir) = create_test_orchestrator().await;
    let orchestrator = Arc::new(orchestrator);
    let app = create_router(orchestrator.clone(), orchestrator.get_config());
    (app, orchestrator, factory, temp_dir)
}

async fn send(app: Router, method: &str, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_serves_until_shutdown() {
    let (orchestrator, _factory, _temp_dir) = create_test_orchestrator().await;
    let orchestrator = Arc::new(orchestrator);
    let config = orchestrator.get_config();

    // Port 0 = OS assigns a free port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let server = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { serve(listener, orchestrator, config).await }
    });

    let response = reqwest::get(format!("http://{address}/api/health"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    orchestrator.shutdown().await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok(), "got {result:?}");
}

#[tokio::test]
async fn test_cors_enabled() {
    let (orchestrator, _factory, _temp_dir) = create_test_orchestrator().await;
    let mut config = (*orchestrator.get_config()).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(Arc::new(orchestrator), Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (orchestrator, _factory, _temp_dir) = create_test_orchestrator().await;
    let mut config = (*orchestrator.get_config()).clone();
    config.server.api.cors_origins = vec!["http://localhost:7505".to_string()];
    let app = create_router(Arc::new(orchestrator), Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:7505")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:7505")
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (orchestrator, _factory, _temp_dir) = create_test_orchestrator().await;
    let mut config = (*orchestrator.get_config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(Arc::new(orchestrator), Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (app, _orchestrator, _factory, _temp_dir) = create_test_app().await;
    let response = send(app, "GET", "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let (orchestrator, _factory, _temp_dir) = create_test_orchestrator().await;
    let mut config = (*orchestrator.get_config()).clone();
    config.server.api.swagger_ui = false;
    let app = create_router(Arc::new(orchestrator), Arc::new(config));
    let response = send(app, "GET", "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _orchestrator, _factory, _temp_dir) = create_test_app().await;
    let response = send(app, "GET", "/api/settings").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
