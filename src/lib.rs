//! # rmd-orchestrator
//!
//! Orchestration layer for a content downloader: starts background download
//! jobs, relays their progress to live observers, caches record store
//! statistics and searches downloaded posts.
//!
//! ## Design
//!
//! - **Library-first** - the HTTP transport in [`api`] is a thin layer over
//!   [`Orchestrator`]
//! - **One job at a time** - a second start while a job is alive is rejected
//! - **Push-only events** - observers subscribe and receive events emitted
//!   after they subscribed, in emission order
//!
//! ## Quick Start
//!
//! ```no_run
//! use rmd_orchestrator::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::new(Config::default()).await?;
//!
//!     // Subscribe to relayed job events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {}", event.payload());
//!         }
//!     });
//!
//!     orchestrator.start_job().await?;
//!     println!("{:?}", orchestrator.get_status().await?);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Record store persistence layer
pub mod db;
/// Error types
pub mod error;
/// Background download jobs
pub mod job;
/// Orchestration front end (decomposed into focused submodules)
pub mod orchestrator;
/// Output-root path containment
pub mod paths;
/// Post search
pub mod search;
/// Statistics aggregation
pub mod stats;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{ApiError, DatabaseError, Error, ErrorDetail, JobError, Result, ToHttpStatus};
pub use job::{
    DownloadJob, EventQueue, JobContext, JobController, JobFactory, ProgressSnapshot,
    TaskController, UrlFetchFactory,
};
pub use orchestrator::Orchestrator;
pub use search::SearchEngine;
pub use stats::{RecordCounts, StatsAggregator};
pub use types::{
    FailedPost, FileId, FileRef, PostKind, PostResult, ProgressEvent, SearchField, SearchRequest,
    SearchResults, StatsSummary, StatusReport,
};

/// Helper function to run the orchestrator until shutdown.
///
/// Returns when a termination signal arrives or when shutdown was requested
/// through the orchestrator (for example `POST /api/shutdown`), after calling
/// [`Orchestrator::shutdown`].
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use rmd_orchestrator::{Config, Orchestrator, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let orchestrator = Orchestrator::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(orchestrator).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(orchestrator: Orchestrator) -> Result<()> {
    let token = orchestrator.shutdown_token();
    tokio::select! {
        _ = wait_for_signal() => {}
        _ = token.cancelled() => {
            tracing::info!("Shutdown requested");
        }
    }
    orchestrator.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
