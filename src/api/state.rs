//! Application state for the API server

use crate::{Config, Orchestrator};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The orchestrator serving every request
    pub orchestrator: Arc<Orchestrator>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(orchestrator: Arc<Orchestrator>, config: Arc<Config>) -> Self {
        Self {
            orchestrator,
            config,
        }
    }
}
