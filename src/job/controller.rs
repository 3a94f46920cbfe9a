//! Runs a [`DownloadJob`] on a tokio task behind the [`JobController`] contract.

use crate::error::JobError;
use crate::types::ProgressEvent;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinHandle;

use super::{EventQueue, JobController, ProgressSnapshot};

/// The body of a background download job
#[async_trait]
pub trait DownloadJob: Send + Sized + 'static {
    /// Do the work, reporting through `ctx`
    ///
    /// The snapshot's `running`, `started_at`, `finished_at` and `error`
    /// fields are maintained by the controller.
    async fn run(self, ctx: JobContext) -> Result<()>;
}

/// Handle a running job uses to report progress
#[derive(Clone)]
pub struct JobContext {
    events: Arc<EventQueue>,
    snapshot: Arc<RwLock<ProgressSnapshot>>,
}

impl JobContext {
    /// Queue a progress event for observers
    pub fn emit(&self, event: ProgressEvent) {
        self.events.push(event);
    }

    /// Mutate the progress snapshot
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ProgressSnapshot),
    {
        let mut snapshot = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut snapshot);
    }

    fn finish(&self, result: &Result<()>) {
        self.update(|s| {
            s.running = false;
            s.current = None;
            s.finished_at = Some(chrono::Utc::now());
            if let Err(e) = result {
                s.error = Some(e.to_string());
            }
        });
    }
}

/// [`JobController`] that runs one [`DownloadJob`] on the tokio runtime
pub struct TaskController<J: DownloadJob> {
    job: Mutex<Option<J>>,
    events: Arc<EventQueue>,
    snapshot: Arc<RwLock<ProgressSnapshot>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<J: DownloadJob> TaskController<J> {
    /// Wrap a job; nothing runs until [`JobController::start`]
    pub fn new(job: J) -> Self {
        Self {
            job: Mutex::new(Some(job)),
            events: Arc::new(EventQueue::new()),
            snapshot: Arc::new(RwLock::new(ProgressSnapshot::default())),
            handle: Mutex::new(None),
        }
    }

    fn context(&self) -> JobContext {
        JobContext {
            events: self.events.clone(),
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<J: DownloadJob> JobController for TaskController<J> {
    fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::Job(JobError::NoRuntime))?;

        let job = self
            .job
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(Error::Job(JobError::AlreadyStarted))?;

        let ctx = self.context();
        ctx.update(|s| {
            s.running = true;
            s.started_at = Some(chrono::Utc::now());
        });

        let handle = runtime.spawn(async move {
            tracing::info!("download job started");
            let result = job.run(ctx.clone()).await;
            match &result {
                Ok(()) => tracing::info!("download job finished"),
                Err(e) => tracing::error!(error = %e, "download job failed"),
            }
            ctx.finish(&result);
        });

        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .running
    }

    fn is_alive(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    fn events(&self) -> &EventQueue {
        &self.events
    }

    fn get_progress(&self) -> ProgressSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
