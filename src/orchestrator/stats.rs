//! Cached statistics summary.

use crate::error::Result;
use crate::types::StatsSummary;

use super::Orchestrator;

impl Orchestrator {
    /// Return the cached summary, computing it on a miss
    ///
    /// The cache is only cleared by [`Orchestrator::start_job`]; job
    /// completion and store writes leave it as is. The lock is not held
    /// while the count queries run. A result computed across a job start is
    /// returned but not cached.
    pub async fn get_cached_stats(&self) -> Result<StatsSummary> {
        let generation = {
            let state = self.state.lock().await;
            if let Some(summary) = state.stats {
                return Ok(summary);
            }
            state.generation
        };

        tracing::debug!(generation, "Statistics cache miss");
        let summary = self.aggregator.compute().await?;

        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.stats = Some(summary);
        }

        Ok(summary)
    }

    /// Whether a summary is currently cached
    pub async fn has_cached_stats(&self) -> bool {
        self.state.lock().await.stats.is_some()
    }
}
