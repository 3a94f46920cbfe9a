//! Composition root tying the job controller, statistics cache, search engine
//! and event relay together.
//!
//! The `Orchestrator` struct and its methods are organized by domain:
//! - [`lifecycle`] - Job start (single-job invariant), status, shutdown
//! - [`stats`] - Cached statistics summary
//! - [`relay`] - Background task forwarding job events to live observers
//! - [`files`] - Token-based file lookup and search delegation

mod files;
mod lifecycle;
mod relay;
mod stats;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::job::{JobController, JobFactory, UrlFetchFactory};
use crate::search::SearchEngine;
use crate::stats::StatsAggregator;
use crate::types::{ProgressEvent, StatsSummary};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State shared between request handlers and the relay, behind one lock
#[derive(Default)]
pub(crate) struct SharedState {
    /// Controller of the most recently started job (may be finished)
    pub(crate) controller: Option<Arc<dyn JobController>>,
    /// Cached summary; `None` means the next read recomputes
    pub(crate) stats: Option<StatsSummary>,
    /// Bumped on every job start so a computation that raced a start is not cached
    pub(crate) generation: u64,
}

/// Orchestration front end (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Orchestrator {
    /// Record store (public for integration tests and embedding jobs)
    pub db: Arc<Database>,
    /// Configuration
    pub(crate) config: Arc<Config>,
    /// Controller reference and statistics cache
    pub(crate) state: Arc<tokio::sync::Mutex<SharedState>>,
    /// Builds a controller per job start
    pub(crate) factory: Arc<dyn JobFactory>,
    /// Runs the count queries on a cache miss
    pub(crate) aggregator: StatsAggregator,
    /// Post search
    pub(crate) search_engine: SearchEngine,
    /// Fan-out channel to live observers
    pub(crate) event_tx: tokio::sync::broadcast::Sender<ProgressEvent>,
    /// Cancelled on operator shutdown; stops the relay
    pub(crate) shutdown: CancellationToken,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in URL fetch job
    ///
    /// This:
    /// - Validates the configuration
    /// - Creates the output root if missing
    /// - Opens/creates the SQLite record store and runs migrations
    /// - Starts the event relay
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(config.base_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create output directory '{}': {}",
                        config.base_dir().display(),
                        e
                    ),
                ))
            })?;

        let db = Arc::new(Database::new(&config.persistence.database_path).await?);
        let factory = Arc::new(UrlFetchFactory::new(
            db.clone(),
            config.base_dir().clone(),
            &config.job,
        )?);

        let orchestrator = Self::with_factory(config, db, factory);
        orchestrator.spawn_event_relay();

        tracing::info!(
            output_root = %orchestrator.config.base_dir().display(),
            "Orchestrator initialized"
        );

        Ok(orchestrator)
    }

    /// Assemble an orchestrator around an existing record store and job factory
    ///
    /// The event relay is not started; call [`Orchestrator::spawn_event_relay`].
    pub fn with_factory(config: Config, db: Arc<Database>, factory: Arc<dyn JobFactory>) -> Self {
        let (event_tx, _rx) =
            tokio::sync::broadcast::channel(config.relay.channel_capacity.max(1));
        let aggregator = StatsAggregator::new(db.clone());
        let search_engine = SearchEngine::new(db.clone(), config.base_dir().clone());

        Self {
            db,
            config: Arc::new(config),
            state: Arc::new(tokio::sync::Mutex::new(SharedState::default())),
            factory,
            aggregator,
            search_engine,
            event_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Subscribe to relayed progress events
    ///
    /// Each subscriber receives every event forwarded after it subscribed, in
    /// emission order. Nothing is replayed. A subscriber that falls behind by
    /// more than `relay.channel_capacity` events gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ProgressEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Token cancelled when shutdown is requested
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
