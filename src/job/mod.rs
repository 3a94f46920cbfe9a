//! Background download jobs
//!
//! A [`JobController`] owns exactly one background job. It exposes a
//! non-blocking [`EventQueue`] of progress events and a cumulative
//! [`ProgressSnapshot`]. The orchestrator never looks inside the job; it only
//! starts it, polls its liveness and drains its queue.
//!
//! ## Submodules
//! - [`queue`] - FIFO of progress events shared between the job and the relay
//! - [`snapshot`] - cumulative job state
//! - [`controller`] - [`TaskController`], which runs a [`DownloadJob`] on a tokio task
//! - [`fetch`] - the default job: fetch every unprocessed URL into the output root

use crate::Result;
use std::sync::Arc;

mod controller;
mod fetch;
mod queue;
mod snapshot;

pub use controller::{DownloadJob, JobContext, TaskController};
pub use fetch::{JobEvent, UrlFetchFactory, UrlFetchJob};
pub use queue::EventQueue;
pub use snapshot::ProgressSnapshot;

/// Contract between the orchestrator and a background download job
pub trait JobController: Send + Sync {
    /// Begin the job asynchronously; returns once the job is scheduled
    fn start(&self) -> Result<()>;

    /// Whether the job has been started and has not finished its work
    fn is_running(&self) -> bool;

    /// Whether the underlying task still exists and has not terminated
    fn is_alive(&self) -> bool;

    /// Progress events emitted by the job, in emission order
    fn events(&self) -> &EventQueue;

    /// Cumulative progress so far
    fn get_progress(&self) -> ProgressSnapshot;
}

/// Builds a fresh controller for each job start
pub trait JobFactory: Send + Sync {
    /// Create a new, not yet started controller
    fn create(&self) -> Arc<dyn JobController>;
}
