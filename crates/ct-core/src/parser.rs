//! Record parser for assistant JSONL logs.
//!
//! One line in, at most one usage frame out. Two shapes carry usage:
//!
//! ```text
//! {"type":"assistant", "message":{"id", "model", "stop_reason", "usage":{..}}, ..}
//! {"type":"progress",  "data":{"message":{"message":{"id", "model", "stop_reason", "usage":{..}}}}, ..}
//! ```
//!
//! The second is a sub-task invocation mirrored into its parent's log and is
//! always background.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::pricing::PricingTable;
use crate::types::BranchName;
use crate::usage::{TokenCounts, UsageRecord};

/// Minimal typed view of a log line (faster than a full `serde_json::Value` walk).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogLine {
    uuid: Option<String>,
    timestamp: Option<Value>,
    is_sidechain: Option<bool>,
    is_compact_summary: Option<bool>,
    git_branch: Option<String>,
    session_id: Option<String>,
    message: Option<ApiMessage>,
    data: Option<ProgressData>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    id: Option<String>,
    model: Option<String>,
    stop_reason: Option<String>,
    usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ProgressData {
    message: Option<ProgressEnvelope>,
}

#[derive(Debug, Deserialize)]
struct ProgressEnvelope {
    message: Option<ApiMessage>,
}

/// A usage-bearing frame extracted from one log line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFrame {
    pub message_id: String,
    /// `None` for a streaming partial, `Some` for the final frame.
    pub stop_reason: Option<String>,
    pub usage: UsageRecord,
}

impl ParsedFrame {
    pub const fn is_final(&self) -> bool {
        self.stop_reason.is_some()
    }
}

/// Cheap check before paying for a JSON parse.
fn might_carry_usage(line: &str) -> bool {
    line.contains("\"usage\"")
}

/// Coerces a token field to a non-negative integer. Anything else is zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_tokens(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map_or(0, |f| f as u64)
        }),
        _ => 0,
    }
}

fn token_counts(usage: &serde_json::Map<String, Value>) -> TokenCounts {
    TokenCounts {
        input: coerce_tokens(usage.get("input_tokens")),
        output: coerce_tokens(usage.get("output_tokens")),
        cache_write: coerce_tokens(usage.get("cache_creation_input_tokens")),
        cache_read: coerce_tokens(usage.get("cache_read_input_tokens")),
    }
}

/// Parses an RFC 3339 string or an epoch-millisecond number.
fn timestamp_ms(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Parses one log line into a usage frame.
///
/// Returns `None` for anything that is not a usage-bearing assistant record:
/// malformed JSON, missing message id, or no usage object.
pub fn parse_line(line: &str, pricing: &PricingTable) -> Option<ParsedFrame> {
    let line = line.trim();
    if line.is_empty() || !might_carry_usage(line) {
        return None;
    }

    let header: LogLine = match serde_json::from_str(line) {
        Ok(header) => header,
        Err(e) => {
            tracing::trace!(error = %e, "skipping malformed JSON line");
            return None;
        }
    };

    let direct = header
        .message
        .as_ref()
        .filter(|m| m.id.is_some() && m.usage.as_ref().is_some_and(Value::is_object));
    let (message, nested) = match direct {
        Some(message) => (message, false),
        None => {
            let mirrored = header
                .data
                .as_ref()
                .and_then(|d| d.message.as_ref())
                .and_then(|e| e.message.as_ref())?;
            (mirrored, true)
        }
    };

    let message_id = message.id.clone().filter(|id| !id.is_empty())?;
    let usage = message.usage.as_ref().and_then(Value::as_object)?;
    let tokens = token_counts(usage);
    let model = message.model.clone().unwrap_or_default();
    let cost_usd = pricing.cost_usd(&model, &tokens);

    let is_background = nested
        || header.is_sidechain.unwrap_or(false)
        || header.is_compact_summary.unwrap_or(false);

    let timestamp = timestamp_ms(header.timestamp.as_ref()).unwrap_or_else(|| {
        tracing::trace!(message_id, "usage record without a parseable timestamp");
        0
    });

    Some(ParsedFrame {
        message_id: message_id.clone(),
        stop_reason: message.stop_reason.clone(),
        usage: UsageRecord {
            record_id: header.uuid,
            message_id,
            timestamp,
            model,
            tokens,
            cost_usd,
            is_background,
            is_partial: false,
            session_id: header.session_id.unwrap_or_default(),
            branch_name: BranchName::or_unknown(header.git_branch.as_deref()),
        },
    })
}
