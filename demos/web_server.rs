//! REST API server example
//!
//! Runs the orchestrator with the REST API enabled. Pass a JSON settings file
//! as the first argument to override the defaults.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:7505/swagger-ui
//! - Start a job via PUT http://localhost:7505/api/download
//! - Poll progress via GET http://localhost:7505/api/status
//! - Stream events via GET http://localhost:7505/api/events

use rmd_orchestrator::api::start_api_server;
use rmd_orchestrator::{Config, Orchestrator, run_with_shutdown};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("rmd_orchestrator=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_json_file(&PathBuf::from(path))?,
        None => Config::default(),
    };
    let address = config.server.api.bind_address;

    let orchestrator = Orchestrator::new(config.clone()).await?;

    println!("Starting rmd-orchestrator REST API server");
    println!("Swagger UI: http://{address}/swagger-ui");
    println!("Events stream: http://{address}/api/events");
    println!();
    println!("Example commands:");
    println!("  curl -X PUT http://{address}/api/download");
    println!("  curl http://{address}/api/status");
    println!(
        "  curl 'http://{address}/api/search?fields=%5B%22title%22%5D&term=cat&page=0&page_size=25'"
    );
    println!("  curl -N http://{address}/api/events");

    let server = tokio::spawn(start_api_server(
        Arc::new(orchestrator.clone()),
        Arc::new(config),
    ));

    run_with_shutdown(orchestrator).await?;
    server.await??;

    Ok(())
}
