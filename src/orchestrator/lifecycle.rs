//! Job start, status and shutdown.

use crate::error::{Error, Result};
use crate::types::StatusReport;

use super::Orchestrator;

impl Orchestrator {
    /// Start a new download job
    ///
    /// Fails with [`Error::AlreadyRunning`] if the current job is still alive;
    /// a job that has finished (or died) does not block a new one. On success
    /// the statistics cache is cleared so the next read recomputes.
    pub async fn start_job(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        if let Some(current) = &state.controller {
            if current.is_alive() {
                tracing::debug!("Rejecting job start: a job is already running");
                return Err(Error::AlreadyRunning);
            }

            // Hand over anything the finished job queued after the relay's last pass
            let leftover = self.forward_queued(current.events());
            if leftover > 0 {
                tracing::debug!(leftover, "Forwarded events left by the previous job");
            }
        }

        let controller = self.factory.create();
        controller.start()?;

        state.controller = Some(controller);
        state.stats = None;
        state.generation += 1;

        tracing::info!(generation = state.generation, "Download job started");
        Ok(())
    }

    /// Whether a job is currently alive
    pub async fn is_job_alive(&self) -> bool {
        self.state
            .lock()
            .await
            .controller
            .as_ref()
            .is_some_and(|c| c.is_alive())
    }

    /// Report the live job's progress, or the cached summary when no job is alive
    pub async fn get_status(&self) -> Result<StatusReport> {
        let controller = self.state.lock().await.controller.clone();

        match controller {
            Some(controller) if controller.is_alive() => {
                Ok(StatusReport::Live(controller.get_progress().to_obj()))
            }
            _ => Ok(StatusReport::idle(self.get_cached_stats().await?)),
        }
    }

    /// Request shutdown
    ///
    /// Stops the event relay. A running job is not cancelled; it ends with the
    /// process.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating shutdown");
        self.shutdown.cancel();

        if self.is_job_alive().await {
            tracing::warn!("Shutting down while a download job is still running");
        }

        tracing::info!(
            "Shutdown complete - database connections will close when the orchestrator is dropped"
        );
        Ok(())
    }
}
