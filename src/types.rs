//! Core types for rmd-orchestrator

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Identifier of a downloaded file, handed to clients as an opaque token
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct FileId(pub i64);

impl FileId {
    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for FileId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FileId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl sqlx::Type<sqlx::Sqlite> for FileId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for FileId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for FileId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Kind of post stored in the record store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PostKind {
    /// A top-level submission
    Submission,
    /// A comment on a submission or another comment
    Comment,
}

impl PostKind {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Submission => "Submission",
            PostKind::Comment => "Comment",
        }
    }

    /// Parse the database representation (unknown values are treated as comments)
    pub fn from_db(value: &str) -> Self {
        match value {
            "Submission" => PostKind::Submission,
            _ => PostKind::Comment,
        }
    }
}

/// Cached aggregate counts over the record store
///
/// This is a projection, never authoritative: it is only as fresh as the
/// last job start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatsSummary {
    /// Number of file records
    pub total_files: i64,
    /// Number of file records flagged as downloaded
    pub total_files_dl: i64,
    /// Number of submissions
    pub total_submissions: i64,
    /// Number of comments
    pub total_comments: i64,
    /// Number of processed URLs
    pub total_urls: i64,
    /// Number of failed URLs
    pub total_urls_failed: i64,
}

/// A single progress message emitted by a download job
///
/// The payload is free-form structured data; the relay never inspects or
/// reorders it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressEvent(serde_json::Value);

impl ProgressEvent {
    /// Wrap an arbitrary JSON payload
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    /// Build an event from any serializable value
    pub fn from_serialize<T: Serialize>(value: &T) -> crate::Result<Self> {
        Ok(Self(serde_json::to_value(value)?))
    }

    /// Borrow the payload
    pub fn payload(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consume the event, returning its payload
    pub fn into_payload(self) -> serde_json::Value {
        self.0
    }
}

/// Text-bearing post columns that may be searched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Post identifier
    RedditId,
    /// Author name
    Author,
    /// Submission title
    Title,
    /// Post body text
    Body,
    /// Parent post identifier
    ParentId,
    /// Subreddit name
    Subreddit,
    /// Alias of the source that found the post
    SourceAlias,
}

impl SearchField {
    /// All searchable fields, in the order they are advertised
    pub const ALL: [SearchField; 7] = [
        SearchField::RedditId,
        SearchField::Author,
        SearchField::Title,
        SearchField::Body,
        SearchField::ParentId,
        SearchField::Subreddit,
        SearchField::SourceAlias,
    ];

    /// Column name in the `posts` table
    pub fn column(&self) -> &'static str {
        match self {
            SearchField::RedditId => "reddit_id",
            SearchField::Author => "author",
            SearchField::Title => "title",
            SearchField::Body => "body",
            SearchField::ParentId => "parent_id",
            SearchField::Subreddit => "subreddit",
            SearchField::SourceAlias => "source_alias",
        }
    }
}

impl std::str::FromStr for SearchField {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchField::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| crate::Error::MalformedRequest(format!("unknown search field '{s}'")))
    }
}

/// Validated search parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Fields to match the term against
    pub fields: Vec<SearchField>,
    /// Substring to look for
    pub term: String,
    /// Zero-based page index
    pub page: u64,
    /// Number of matches per page
    pub page_size: u64,
}

/// A downloaded file reference attached to a search result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileRef {
    /// Opaque token used to fetch the file
    pub token: FileId,
    /// Absolute location of the file inside the output root
    #[schema(value_type = String)]
    pub path: PathBuf,
}

/// A post returned by search, with its retrievable files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PostResult {
    /// Post identifier
    pub reddit_id: String,
    /// Author name
    pub author: String,
    /// Submission or comment
    #[serde(rename = "type")]
    pub kind: PostKind,
    /// Submission title
    pub title: Option<String>,
    /// Body text
    pub body: Option<String>,
    /// Parent post identifier
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
    /// Downloaded files for this post
    pub files: Vec<FileRef>,
}

/// Paginated search response
///
/// `total` counts every match before pagination and before posts without
/// retrievable files are dropped, so it can exceed the number of results.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResults {
    /// Number of matching posts
    pub total: usize,
    /// Posts on the requested page that have at least one file
    pub results: Vec<PostResult>,
}

/// Answer to a status query
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusReport {
    /// No job is alive; carries the cached summary
    Idle {
        /// Always false
        running: bool,
        /// Cached record store summary
        summary: StatsSummary,
    },
    /// Snapshot of the live job
    Live(serde_json::Value),
}

impl StatusReport {
    /// Build the idle report
    pub fn idle(summary: StatsSummary) -> Self {
        StatusReport::Idle {
            running: false,
            summary,
        }
    }

    /// Whether this report describes a live job
    pub fn is_live(&self) -> bool {
        matches!(self, StatusReport::Live(_))
    }
}

/// A post that owns at least one failed URL
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FailedPost {
    /// Post identifier
    pub reddit_id: String,
    /// Author name
    pub author: String,
    /// Submission or comment
    #[serde(rename = "type")]
    pub kind: PostKind,
    /// Submission title
    pub title: Option<String>,
    /// Subreddit name
    pub subreddit: String,
    /// Creation time (unix seconds)
    pub created_utc: i64,
    /// Alias of the source that found the post
    pub source_alias: String,
    /// Addresses that failed to download
    pub failed_urls: Vec<String>,
}
