//! Normalized usage records.

use serde::{Deserialize, Serialize};

use crate::types::BranchName;

/// Token counts for one model invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
    pub cache_write: u64,
    pub cache_read: u64,
}

/// One billable model invocation.
///
/// `message_id` identifies the invocation across every log it appears in;
/// `record_id` identifies the raw log line it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub message_id: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub model: String,
    pub tokens: TokenCounts,
    pub cost_usd: f64,
    pub is_background: bool,
    /// Emitted from a streaming frame that never saw its final frame.
    #[serde(default)]
    pub is_partial: bool,
    pub session_id: String,
    pub branch_name: BranchName,
}
