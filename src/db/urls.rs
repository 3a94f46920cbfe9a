//! URL inserts and processing state.

use crate::error::DatabaseError;
use crate::types::FileId;
use crate::{Error, Result};
use sqlx::FromRow;

use super::{Database, File, Url, UrlRecord};

/// URL row joined with its (optional) file
#[derive(FromRow)]
struct UrlFileRow {
    id: i64,
    post_id: i64,
    address: String,
    processed: i32,
    failed: i32,
    file_id: Option<FileId>,
    file_path: Option<String>,
    file_downloaded: Option<i32>,
    file_created_at: Option<i64>,
}

impl From<UrlFileRow> for UrlRecord {
    fn from(row: UrlFileRow) -> Self {
        let file = match (row.file_id, row.file_path) {
            (Some(id), Some(path)) => Some(File {
                id,
                path,
                downloaded: row.file_downloaded.unwrap_or(0),
                created_at: row.file_created_at.unwrap_or(0),
            }),
            _ => None,
        };

        UrlRecord {
            url: Url {
                id: row.id,
                post_id: row.post_id,
                address: row.address,
                processed: row.processed,
                failed: row.failed,
                file_id: row.file_id,
            },
            file,
        }
    }
}

impl Database {
    /// Insert a new URL owned by `post_id`
    pub async fn insert_url(&self, post_id: i64, address: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO urls (post_id, address) VALUES (?, ?)")
            .bind(post_id)
            .bind(address)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to insert url: {}",
                    e
                )))
            })?;

        Ok(result.last_insert_rowid())
    }

    /// Get a URL by ID
    pub async fn get_url(&self, id: i64) -> Result<Option<Url>> {
        let row = sqlx::query_as::<_, Url>(
            "SELECT id, post_id, address, processed, failed, file_id FROM urls WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get url: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// Record the outcome of a download attempt
    pub async fn mark_url_processed(&self, id: i64, failed: bool) -> Result<()> {
        sqlx::query("UPDATE urls SET processed = 1, failed = ? WHERE id = ?")
            .bind(failed as i32)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to mark url processed: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// Attach the file a URL produced
    pub async fn attach_file(&self, url_id: i64, file_id: FileId) -> Result<()> {
        sqlx::query("UPDATE urls SET file_id = ? WHERE id = ?")
            .bind(file_id)
            .bind(url_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    Error::Database(DatabaseError::ConstraintViolation(format!(
                        "File {} is already attached to another url",
                        file_id
                    )))
                }
                e => Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to attach file: {}",
                    e
                ))),
            })?;

        Ok(())
    }

    /// List URLs that have not been attempted yet, oldest first
    pub async fn list_unprocessed_urls(&self) -> Result<Vec<Url>> {
        let rows = sqlx::query_as::<_, Url>(
            r#"
            SELECT id, post_id, address, processed, failed, file_id
            FROM urls
            WHERE processed = 0
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list unprocessed urls: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// URLs owned by a post with their files, in insertion order
    pub(crate) async fn urls_for_post(&self, post_id: i64) -> Result<Vec<UrlRecord>> {
        let rows = sqlx::query_as::<_, UrlFileRow>(
            r#"
            SELECT
                u.id, u.post_id, u.address, u.processed, u.failed, u.file_id,
                f.path AS file_path,
                f.downloaded AS file_downloaded,
                f.created_at AS file_created_at
            FROM urls u
            LEFT JOIN files f ON f.id = u.file_id
            WHERE u.post_id = ?
            ORDER BY u.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to load urls for post: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }
}
