//! Error types for rmd-orchestrator
//!
//! This module provides error handling for the orchestration layer, including:
//! - Caller-facing error kinds (already running, not found, path violation, ...)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for rmd-orchestrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rmd-orchestrator
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output.base_dir")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// A download job is already alive
    #[error("a download job is already running")]
    AlreadyRunning,

    /// A file token or path did not resolve
    #[error("not found: {0}")]
    NotFound(String),

    /// A stored file path escapes the output root
    #[error("path {path} escapes output root {root}")]
    PathViolation {
        /// The offending stored path
        path: PathBuf,
        /// The configured output root
        root: PathBuf,
    },

    /// Request inputs failed validation
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// One of the statistics count queries failed
    #[error("failed to aggregate statistics: {0}")]
    AggregationFailure(String),

    /// Download job error
    #[error("job error: {0}")]
    Job(#[from] JobError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Constraint violation (e.g., duplicate key)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Errors raised by a job controller
#[derive(Debug, Error)]
pub enum JobError {
    /// `start()` was called on a controller that has already been started
    #[error("job controller already started")]
    AlreadyStarted,

    /// `start()` was called outside of a tokio runtime
    #[error("no async runtime available to spawn the job")]
    NoRuntime,

    /// The job body returned an error
    #[error("job failed: {0}")]
    Failed(String),
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "already_running",
///     "message": "a download job is already running"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "malformed_request")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::MalformedRequest(_) => 400,

            // 403 Forbidden - never serve paths outside the output root
            Error::PathViolation { .. } => 403,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict
            Error::AlreadyRunning => 409,
            Error::Job(JobError::AlreadyStarted) => 409,

            // 500 Internal Server Error - Server-side issues
            Error::Database(_) => 500,
            Error::AggregationFailure(_) => 500,
            Error::Job(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - External service errors
            Error::Network(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) => "database_error",
            Error::AlreadyRunning => "already_running",
            Error::NotFound(_) => "not_found",
            Error::PathViolation { .. } => "path_violation",
            Error::MalformedRequest(_) => "malformed_request",
            Error::AggregationFailure(_) => "aggregation_failure",
            Error::Job(e) => match e {
                JobError::AlreadyStarted => "job_already_started",
                JobError::NoRuntime => "job_no_runtime",
                JobError::Failed(_) => "job_failed",
            },
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();

        // Never echo the absolute output root back to callers
        let (message, details) = match &error {
            Error::PathViolation { path, .. } => (
                format!("path {} escapes the output root", path.display()),
                Some(serde_json::json!({ "path": path })),
            ),
            Error::Config { key: Some(key), .. } => {
                (error.to_string(), Some(serde_json::json!({ "key": key })))
            }
            _ => (error.to_string(), None),
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
