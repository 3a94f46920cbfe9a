//! Paginated post search with resolved file references
//!
//! Matching and paging are delegated to the record store. The engine
//! resolves each post's files against the output root and drops posts left
//! with nothing retrievable. `total` is the match count
//! before both pagination and the drop.

use crate::db::{Database, PostRecord};
use crate::paths::resolve_within;
use crate::types::{FileRef, SearchField, SearchRequest, SearchResults};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Searches posts and resolves their downloaded files
#[derive(Clone)]
pub struct SearchEngine {
    db: Arc<Database>,
    base_dir: PathBuf,
}

impl SearchEngine {
    /// Create an engine over `db`, resolving files inside `base_dir`
    pub fn new(db: Arc<Database>, base_dir: PathBuf) -> Self {
        Self { db, base_dir }
    }

    /// Fields callers may search on
    pub fn searchable_fields() -> &'static [SearchField] {
        &SearchField::ALL
    }

    /// Run a search
    ///
    /// Page `n` covers matches `[n * page_size, (n + 1) * page_size)` in
    /// newest-first order. There is no upper bound on `page_size`.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let fields = dedup_fields(&request.fields);
        let window = self
            .db
            .search_posts(&fields, &request.term, request.page, request.page_size)
            .await?;

        let results = window
            .records
            .iter()
            .filter_map(|record| {
                let files = self.resolve_files(record);
                (!files.is_empty()).then(|| record.to_result(files))
            })
            .collect();

        Ok(SearchResults {
            total: usize::try_from(window.total).unwrap_or(0),
            results,
        })
    }

    /// Files of a post that exist inside the output root
    fn resolve_files(&self, record: &PostRecord) -> Vec<FileRef> {
        record
            .files()
            .filter_map(|file| match resolve_within(&self.base_dir, Path::new(&file.path)) {
                Ok(path) => Some(FileRef {
                    token: file.id,
                    path,
                }),
                Err(Error::PathViolation { .. }) => {
                    tracing::warn!(
                        file_id = %file.id,
                        post = %record.post.reddit_id,
                        "dropping file whose path escapes the output root"
                    );
                    None
                }
                Err(_) => None,
            })
            .collect()
    }
}

/// Keep the first occurrence of each field
fn dedup_fields(fields: &[SearchField]) -> Vec<SearchField> {
    let mut unique = Vec::with_capacity(fields.len());
    for field in fields {
        if !unique.contains(field) {
            unique.push(*field);
        }
    }
    unique
}
