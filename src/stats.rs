//! Summary counts over the record store
//!
//! [`StatsAggregator`] runs the six count queries behind a
//! [`StatsSummary`]. It does not cache; the orchestrator owns the cache and
//! decides when a recomputation happens.

use crate::db::Database;
use crate::types::{PostKind, StatsSummary};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Count queries the aggregator needs from the record store
#[async_trait]
pub trait RecordCounts: Send + Sync {
    /// Number of file records
    async fn count_files(&self) -> Result<i64>;
    /// Number of file records flagged as downloaded
    async fn count_downloaded_files(&self) -> Result<i64>;
    /// Number of posts of one kind
    async fn count_posts(&self, kind: PostKind) -> Result<i64>;
    /// Number of processed URLs
    async fn count_processed_urls(&self) -> Result<i64>;
    /// Number of failed URLs
    async fn count_failed_urls(&self) -> Result<i64>;
}

#[async_trait]
impl RecordCounts for Database {
    async fn count_files(&self) -> Result<i64> {
        Database::count_files(self).await
    }

    async fn count_downloaded_files(&self) -> Result<i64> {
        Database::count_downloaded_files(self).await
    }

    async fn count_posts(&self, kind: PostKind) -> Result<i64> {
        Database::count_posts(self, kind).await
    }

    async fn count_processed_urls(&self) -> Result<i64> {
        Database::count_processed_urls(self).await
    }

    async fn count_failed_urls(&self) -> Result<i64> {
        Database::count_failed_urls(self).await
    }
}

/// Computes [`StatsSummary`] values
#[derive(Clone)]
pub struct StatsAggregator {
    counts: Arc<dyn RecordCounts>,
}

impl StatsAggregator {
    /// Create an aggregator over a count source
    pub fn new(counts: Arc<dyn RecordCounts>) -> Self {
        Self { counts }
    }

    /// Run the six count queries
    ///
    /// # Errors
    /// [`Error::AggregationFailure`] wrapping the first query that failed
    pub async fn compute(&self) -> Result<StatsSummary> {
        let summary = StatsSummary {
            total_files: Self::count(self.counts.count_files(), "total files").await?,
            total_files_dl: Self::count(self.counts.count_downloaded_files(), "downloaded files")
                .await?,
            total_submissions: Self::count(
                self.counts.count_posts(PostKind::Submission),
                "submissions",
            )
            .await?,
            total_comments: Self::count(self.counts.count_posts(PostKind::Comment), "comments")
                .await?,
            total_urls: Self::count(self.counts.count_processed_urls(), "processed urls").await?,
            total_urls_failed: Self::count(self.counts.count_failed_urls(), "failed urls").await?,
        };

        tracing::debug!(?summary, "computed record store statistics");
        Ok(summary)
    }

    async fn count(
        query: impl std::future::Future<Output = Result<i64>>,
        what: &str,
    ) -> Result<i64> {
        query.await.map_err(|e| {
            tracing::error!(error = %e, what, "statistics count query failed");
            Error::AggregationFailure(format!("{}: {}", what, e))
        })
    }
}
