//! curt - Claude Usage Relay Tool
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use curt::cli::{Cli, Commands};
use curt::core::logging;
use curt::error::CurtError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = cli
        .log_level
        .as_deref()
        .and_then(logging::LogLevel::from_arg)
        .or_else(|| logging::parse_log_level_from_env().map(logging::LogLevel::from_tracing_level))
        .unwrap_or_default();
    let log_format = cli
        .log_format
        .as_deref()
        .and_then(logging::LogFormat::from_arg)
        .or_else(logging::parse_log_format_from_env)
        .unwrap_or_default();
    let log_file = cli
        .log_file
        .clone()
        .or_else(logging::parse_log_file_from_env);
    logging::init(log_level, log_format, log_file, cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{}", e);
            eprintln!("{}", render_error(&e));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> curt::Result<()> {
    match cli.command {
        // An MCP client launches the binary with no arguments
        None | Some(Commands::Serve) => curt::cli::serve::execute().await,

        Some(Commands::Send(args)) => curt::cli::send::execute(&args).await,

        Some(Commands::Setup(args)) => curt::cli::setup::execute(&args),

        Some(Commands::Doctor(args)) => curt::cli::doctor::execute(&args).await,

        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "curt", &mut io::stdout());
            Ok(())
        }
    }
}

/// Render an error with its fix suggestions as plain text on stderr.
fn render_error(error: &CurtError) -> String {
    let suggestions = error.fix_suggestions();
    let mut lines = Vec::new();

    lines.push(format!(
        "{}: {} [{}]",
        error.category(),
        error,
        error.error_code()
    ));

    if !suggestions.is_empty() {
        lines.push(String::new());
        lines.push("How to fix:".to_string());
        for (i, suggestion) in suggestions.iter().enumerate() {
            for (j, cmd) in suggestion.commands.iter().enumerate() {
                let prefix = if j == 0 {
                    format!("  {}. ", i + 1)
                } else {
                    "     Or: ".to_string()
                };
                lines.push(format!("{prefix}{cmd}"));
            }
        }
    }

    if let Some(context) = suggestions.first().map(|s| s.context.as_str()) {
        if !context.is_empty() {
            lines.push(String::new());
            lines.push("Why this happened:".to_string());
            lines.push(format!("  {context}"));
        }
    }

    if let Some(prevention) = suggestions.first().and_then(|s| s.prevention.as_deref()) {
        lines.push(String::new());
        lines.push("Prevention:".to_string());
        lines.push(format!("  {prevention}"));
    }

    if let Some(doc_url) = suggestions.first().and_then(|s| s.doc_url.as_deref()) {
        lines.push(String::new());
        lines.push(format!("Docs: {doc_url}"));
    }

    lines.join("\n")
}
