//! Cumulative job state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cumulative state of a download job
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressSnapshot {
    /// Whether the job is currently doing work
    pub running: bool,
    /// When the job started
    #[schema(value_type = Option<String>, format = DateTime)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the job finished
    #[schema(value_type = Option<String>, format = DateTime)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Number of items the job intends to process
    pub total: u64,
    /// Number of items processed so far (including failures)
    pub processed: u64,
    /// Number of items that failed
    pub failed: u64,
    /// Item currently being processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    /// Error that ended the job, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressSnapshot {
    /// Plain structured view handed to status callers
    pub fn to_obj(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize progress snapshot");
            serde_json::json!({ "running": self.running })
        })
    }
}
