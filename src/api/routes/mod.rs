//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] - Job start, status and statistics
//! - [`search`] - Post search, searchable fields, failed posts
//! - [`files`] - Token-based file download
//! - [`system`] - Health, version, events, OpenAPI, shutdown

use crate::error::{Error, Result};
use crate::types::{SearchField, SearchRequest};
use serde::{Deserialize, Serialize};

mod files;
mod jobs;
mod search;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use files::*;
pub use jobs::*;
pub use search::*;
pub use system::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /api/search
///
/// Every parameter is required. They are taken as raw strings so a bad value
/// surfaces as a `malformed_request` error body instead of an extractor
/// rejection.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// JSON array of field names, e.g. `["title","author"]`
    pub fields: Option<String>,
    /// Substring to search for; leading and trailing `%` are stripped
    pub term: Option<String>,
    /// Zero-based page index
    pub page: Option<String>,
    /// Matches per page
    pub page_size: Option<String>,
}

impl SearchQuery {
    /// Validate the raw parameters into a [`SearchRequest`]
    pub fn into_request(self) -> Result<SearchRequest> {
        let fields = parse_fields(&required(self.fields, "fields")?)?;
        let term = required(self.term, "term")?
            .trim_matches('%')
            .to_string();
        let page = parse_count(&required(self.page, "page")?, "page")?;
        let page_size = parse_count(&required(self.page_size, "page_size")?, "page_size")?;

        Ok(SearchRequest {
            fields,
            term,
            page,
            page_size,
        })
    }
}

/// Query parameters for GET /file
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileQuery {
    /// File token from a search result
    pub id: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value.ok_or_else(|| Error::MalformedRequest(format!("missing query parameter '{name}'")))
}

fn parse_fields(raw: &str) -> Result<Vec<SearchField>> {
    let names: Vec<String> = serde_json::from_str(raw).map_err(|e| {
        Error::MalformedRequest(format!("fields must be a JSON array of strings: {e}"))
    })?;
    names.iter().map(|name| name.parse()).collect()
}

fn parse_count(raw: &str, name: &str) -> Result<u64> {
    raw.trim().parse().map_err(|_| {
        Error::MalformedRequest(format!("{name} must be a non-negative integer, got '{raw}'"))
    })
}
