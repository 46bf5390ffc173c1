//! Send pipeline.
//!
//! Orchestrates one report: capture ccusage output, parse today's table,
//! assemble the payload, and deliver it to the webhook. Both the `send`
//! command and the MCP `send-usage` tool run through here.

use chrono::{Local, NaiveDate};

use crate::core::parser;
use crate::core::report::{self, UsageReport};
use crate::core::runner::CcusageInvocation;
use crate::core::webhook;
use crate::error::{CurtError, Result};
use crate::storage::ResolvedConfig;

/// What one send produced.
#[derive(Debug)]
pub struct SendOutcome {
    pub report: UsageReport,
    /// Response body from the webhook, when the endpoint sent one. Always
    /// `None` for dry runs.
    pub response: Option<String>,
    /// Whether the report actually went out.
    pub delivered: bool,
}

impl SendOutcome {
    /// The confirmation block for the operator (or the MCP client).
    #[must_use]
    pub fn summary(&self) -> String {
        report::render_summary(&self.report, self.response.as_deref())
    }
}

/// Run the full pipeline: capture, parse, assemble, deliver.
///
/// `date` selects a past day; `None` reports today. With `dry_run` the
/// payload is assembled but nothing leaves the machine, and no webhook URL
/// is required.
///
/// # Errors
///
/// Returns error if the webhook URL is missing (non-dry runs), ccusage is
/// not installed or fails, no usage row exists for the day, or delivery
/// fails.
pub async fn send_usage(
    config: &ResolvedConfig,
    note: &str,
    date: Option<NaiveDate>,
    dry_run: bool,
) -> Result<SendOutcome> {
    // Resolve the URL before spending up to a whole ccusage run on a
    // misconfigured install.
    let webhook_url = if dry_run {
        None
    } else {
        Some(config.require_webhook_url()?.to_string())
    };

    let invocation = CcusageInvocation::from_command(&config.ccusage_command)?;
    if !invocation.is_available() {
        return Err(CurtError::CliNotFound {
            name: invocation.program().to_string(),
        });
    }

    // A past day cannot appear in --today output, so historical reports
    // capture the whole daily table and let the parser pick the row.
    tracing::info!(command = %config.ccusage_command, "Capturing ccusage output");
    let raw = match date {
        Some(_) => invocation.capture_full(config.ccusage_timeout).await?,
        None => invocation.capture_today(config.ccusage_timeout).await?,
    };

    let reference = date.unwrap_or_else(|| Local::now().date_naive());
    let parsed = parser::parse_usage_table(&raw, reference);
    for event in &parsed.trace {
        tracing::debug!(event = %event, "Parser decision");
    }

    if !parsed.record.found {
        return Err(CurtError::UsageNotFound {
            date: reference.format("%Y-%m-%d").to_string(),
        });
    }

    tracing::info!(
        total_tokens = parsed.record.total_tokens,
        total_cost = parsed.record.total_cost,
        models = parsed.record.models.len(),
        "Parsed today's usage"
    );

    let report = UsageReport::build(&parsed.record, &config.user, note, &raw);

    let Some(url) = webhook_url else {
        tracing::info!("Dry run, skipping delivery");
        return Ok(SendOutcome {
            report,
            response: None,
            delivered: false,
        });
    };

    let client = webhook::build_client(config.webhook_timeout)?;
    tracing::info!(user = %report.user, "Delivering report to webhook");
    let response = webhook::post_report(&client, &url, &report, config.webhook_timeout).await?;
    tracing::info!(
        response_len = response.as_deref().map_or(0, str::len),
        "Webhook accepted the report"
    );

    Ok(SendOutcome {
        report,
        response,
        delivered: true,
    })
}
