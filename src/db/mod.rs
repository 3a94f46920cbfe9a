//! Database layer for rmd-orchestrator
//!
//! Handles SQLite persistence for the post/URL/file graph the downloader
//! populates and the orchestrator reads.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`posts`] - Post inserts, search and failed-post listing
//! - [`urls`] - URL inserts and processing state
//! - [`files`] - File records and token lookup
//! - [`counts`] - Aggregate counts behind the statistics summary

use crate::types::{FileId, FileRef, PostKind, PostResult};
use sqlx::{FromRow, sqlite::SqlitePool};

mod counts;
mod files;
mod migrations;
mod posts;
mod urls;

/// New post to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Reddit identifier (e.g. "t3_abc123")
    pub reddit_id: String,
    /// Submission or comment
    pub kind: PostKind,
    /// Author name
    pub author: String,
    /// Submission title (comments have none)
    pub title: Option<String>,
    /// Self text or comment body
    pub body: Option<String>,
    /// Reddit identifier of the parent post, if any
    pub parent_id: Option<String>,
    /// Subreddit name
    pub subreddit: String,
    /// Adult-content flag
    pub over_18: bool,
    /// Creation time (unix seconds)
    pub created_utc: i64,
    /// Number of comments
    pub num_comments: i64,
    /// Score
    pub score: i64,
    /// Alias of the source that found the post
    pub source_alias: String,
}

/// Post record from database
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    /// Unique database ID
    pub id: i64,
    /// Reddit identifier
    pub reddit_id: String,
    /// "Submission" or "Comment"
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Author name
    pub author: String,
    /// Submission title
    pub title: Option<String>,
    /// Self text or comment body
    pub body: Option<String>,
    /// Reddit identifier of the parent post
    pub parent_id: Option<String>,
    /// Subreddit name
    pub subreddit: String,
    /// Adult-content flag (0 = no, 1 = yes)
    pub over_18: i32,
    /// Creation time (unix seconds)
    pub created_utc: i64,
    /// Number of comments
    pub num_comments: i64,
    /// Score
    pub score: i64,
    /// Alias of the source that found the post
    pub source_alias: String,
}

/// URL record from database
#[derive(Debug, Clone, FromRow)]
pub struct Url {
    /// Unique database ID
    pub id: i64,
    /// Owning post
    pub post_id: i64,
    /// Address to download
    pub address: String,
    /// Whether a download attempt has finished (0 = no, 1 = yes)
    pub processed: i32,
    /// Whether the attempt failed (0 = no, 1 = yes)
    pub failed: i32,
    /// File produced by this URL, if any
    pub file_id: Option<FileId>,
}

/// File record from database
#[derive(Debug, Clone, FromRow)]
pub struct File {
    /// Unique database ID (handed to clients as the file token)
    pub id: FileId,
    /// Location relative to the output root
    pub path: String,
    /// Whether the content has been written (0 = no, 1 = yes)
    pub downloaded: i32,
    /// Unix timestamp when the record was created
    pub created_at: i64,
}

/// A URL together with the file it produced
#[derive(Debug, Clone)]
pub struct UrlRecord {
    /// The URL row
    pub url: Url,
    /// The attached file, if the URL produced one
    pub file: Option<File>,
}

/// A post with its owned URL/File graph populated
#[derive(Debug, Clone)]
pub struct PostRecord {
    /// The post row
    pub post: Post,
    /// URLs owned by the post, in insertion order
    pub urls: Vec<UrlRecord>,
}

impl PostRecord {
    /// Files reachable from this post, in URL order
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.urls.iter().filter_map(|u| u.file.as_ref())
    }

    /// Build the client-facing result from already resolved file references
    pub fn to_result(&self, files: Vec<FileRef>) -> PostResult {
        let post = &self.post;
        PostResult {
            reddit_id: post.reddit_id.clone(),
            author: post.author.clone(),
            kind: PostKind::from_db(&post.kind),
            title: post.title.clone(),
            body: post.body.clone(),
            parent_id: post.parent_id.clone(),
            subreddit: post.subreddit.clone(),
            over_18: post.over_18 != 0,
            created_utc: post.created_utc,
            num_comments: post.num_comments,
            score: post.score,
            source_alias: post.source_alias.clone(),
            files,
        }
    }
}

/// One page of search matches and the match count it was paged against
#[derive(Debug, Clone, Default)]
pub struct SearchWindow {
    /// Matches before pagination
    pub total: i64,
    /// Posts on the requested page, newest first
    pub records: Vec<PostRecord>,
}

/// Database handle for rmd-orchestrator
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
