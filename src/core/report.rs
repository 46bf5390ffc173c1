//! Report assembly.
//!
//! Builds the webhook payload and renders the human summary block for a
//! parsed day. Field names follow the n8n workflow contract, so the two
//! cache keys keep their `...InputTokens` spelling and everything else is
//! camelCase.

use std::collections::BTreeMap;

use chrono::{Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::core::parser::UsageRecord;
use crate::util::{format_cost, format_count};

// =============================================================================
// Payload
// =============================================================================

/// The JSON payload POSTed to the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// Who this usage belongs to, as resolved from configuration.
    pub user: String,
    /// RFC 3339 UTC instant of the send.
    pub timestamp: String,
    /// Operator's local calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Operator's local wall-clock time, `HH:MM:SS`.
    pub time: String,
    /// Free-form annotation; empty string when none was given.
    pub note: String,
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(rename = "cacheCreationInputTokens")]
    pub cache_creation_tokens: u64,
    #[serde(rename = "cacheReadInputTokens")]
    pub cache_read_tokens: u64,
    pub total_cost: f64,
    pub models: BTreeMap<String, u64>,
    /// The captured table text the numbers came from, for downstream
    /// debugging.
    pub raw_output: String,
}

impl UsageReport {
    /// Assemble a payload from a parsed record, stamped with the current
    /// time.
    #[must_use]
    pub fn build(record: &UsageRecord, user: &str, note: &str, raw_output: &str) -> Self {
        let now_local = Local::now();

        Self {
            user: user.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            date: now_local.format("%Y-%m-%d").to_string(),
            time: now_local.format("%H:%M:%S").to_string(),
            note: note.to_string(),
            total_tokens: record.total_tokens,
            input_tokens: record.input_tokens,
            output_tokens: record.output_tokens,
            cache_creation_tokens: record.cache_creation_tokens,
            cache_read_tokens: record.cache_read_tokens,
            total_cost: record.total_cost,
            models: record.models.clone(),
            raw_output: raw_output.to_string(),
        }
    }
}

// =============================================================================
// Summary Rendering
// =============================================================================

/// Render the confirmation block shown after a successful send.
///
/// `response` is the webhook's response body, when it sent one.
#[must_use]
pub fn render_summary(report: &UsageReport, response: Option<&str>) -> String {
    let mut out = String::new();

    out.push_str("\u{2705} Token usage data sent successfully!\n\n");
    out.push_str("\u{1f4ca} **Summary:**\n");
    out.push_str(&format!(
        "- Total Tokens: {}\n",
        format_count(report.total_tokens)
    ));
    out.push_str(&format!("- Input: {}\n", format_count(report.input_tokens)));
    out.push_str(&format!(
        "- Output: {}\n",
        format_count(report.output_tokens)
    ));
    out.push_str(&format!(
        "- Cache Creation: {}\n",
        format_count(report.cache_creation_tokens)
    ));
    out.push_str(&format!(
        "- Cache Read: {}\n",
        format_count(report.cache_read_tokens)
    ));
    out.push_str(&format!("- Cost: {}\n", format_cost(report.total_cost)));
    out.push_str(&format!("- User: {}\n", report.user));
    if !report.note.is_empty() {
        out.push_str(&format!("- Note: {}\n", report.note));
    }
    out.push_str(&format!(
        "\nResponse from n8n: {}",
        response.unwrap_or("Success")
    ));

    out
}

// =============================================================================
// Tests
// =============================================================================
