//! Core pipeline: capture, parse, report, deliver.

pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod webhook;

pub use parser::{
    DateKeys, ParsedUsage, StopReason, TableLayout, TraceEvent, UsageRecord, parse_usage_table,
    parse_usage_table_today, strip_ansi,
};
pub use pipeline::{SendOutcome, send_usage};
pub use report::{UsageReport, render_summary};
pub use runner::{CcusageInvocation, CliOutput, run_command};
