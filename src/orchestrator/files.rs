//! Token-based file lookup and search delegation.

use crate::error::{Error, Result};
use crate::paths::resolve_within;
use crate::search::SearchEngine;
use crate::types::{FailedPost, FileId, SearchField, SearchRequest, SearchResults};
use std::path::{Path, PathBuf};

use super::Orchestrator;

impl Orchestrator {
    /// Search posts, returning one page of results with retrievable files
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.search_engine.search(request).await
    }

    /// Fields accepted by [`Orchestrator::search`]
    pub fn searchable_fields(&self) -> &'static [SearchField] {
        SearchEngine::searchable_fields()
    }

    /// Resolve a file token to an absolute path inside the output root
    ///
    /// # Errors
    /// - [`Error::NotFound`] for unknown tokens and files missing on disk
    /// - [`Error::PathViolation`] if the stored path escapes the output root
    pub async fn resolve_file(&self, token: FileId) -> Result<PathBuf> {
        let file = self
            .db
            .get_file(token)
            .await?
            .ok_or_else(|| Error::NotFound(format!("file {}", token)))?;

        resolve_within(self.config.base_dir(), Path::new(&file.path))
    }

    /// Posts that own at least one failed URL
    pub async fn failed_posts(&self) -> Result<Vec<FailedPost>> {
        self.db.posts_with_failed_urls().await
    }
}
