//! Aggregate counts behind the statistics summary.

use crate::error::DatabaseError;
use crate::types::PostKind;
use crate::{Error, Result};

use super::Database;

impl Database {
    async fn count(&self, sql: &str, what: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count {}: {}",
                    what, e
                )))
            })
    }

    /// Number of file records
    pub async fn count_files(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM files", "files").await
    }

    /// Number of file records flagged as downloaded
    pub async fn count_downloaded_files(&self) -> Result<i64> {
        self.count(
            "SELECT COUNT(*) FROM files WHERE downloaded = 1",
            "downloaded files",
        )
        .await
    }

    /// Number of posts of one kind
    pub async fn count_posts(&self, kind: PostKind) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE type = ?")
            .bind(kind.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count posts: {}",
                    e
                )))
            })
    }

    /// Number of URLs with a finished download attempt
    pub async fn count_processed_urls(&self) -> Result<i64> {
        self.count(
            "SELECT COUNT(*) FROM urls WHERE processed = 1",
            "processed urls",
        )
        .await
    }

    /// Number of URLs whose download failed
    pub async fn count_failed_urls(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM urls WHERE failed = 1", "failed urls")
            .await
    }
}
