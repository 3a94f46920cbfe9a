//! File records and token lookup.

use crate::error::DatabaseError;
use crate::types::FileId;
use crate::{Error, Result};

use super::{Database, File};

impl Database {
    /// Insert a new file record
    ///
    /// `path` is stored exactly as given; it is validated against the output
    /// root only when read back.
    pub async fn insert_file(&self, path: &str, downloaded: bool) -> Result<FileId> {
        let now = chrono::Utc::now().timestamp();

        let result =
            sqlx::query("INSERT INTO files (path, downloaded, created_at) VALUES (?, ?, ?)")
                .bind(path)
                .bind(downloaded as i32)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to insert file: {}",
                        e
                    )))
                })?;

        Ok(FileId(result.last_insert_rowid()))
    }

    /// Get a file by its token
    pub async fn get_file(&self, id: FileId) -> Result<Option<File>> {
        let row = sqlx::query_as::<_, File>(
            "SELECT id, path, downloaded, created_at FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get file: {}",
                e
            )))
        })?;

        Ok(row)
    }
}
