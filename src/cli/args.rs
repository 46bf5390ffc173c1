//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Send Claude Code token usage from ccusage to the team webhook.
#[derive(Parser, Debug)]
#[command(name = "curt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Defaults to `serve` so an MCP client can launch the binary with no
    /// arguments.
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (human, json, compact)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Append logs to a file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture today's usage and send it to the webhook
    Send(SendArgs),

    /// Run the MCP stdio server (default when no command is given)
    Serve,

    /// Configure the webhook URL and reporter name
    Setup(SetupArgs),

    /// Diagnose curt setup: ccusage, config file, webhook
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the `send` command.
#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Note or comment to attach to the report
    #[arg(long, value_name = "TEXT")]
    pub note: Option<String>,

    /// Webhook URL override (otherwise N8N_WEBHOOK_URL or the config file)
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Reporter name override (otherwise CCUSAGE_USER_ID or the config file)
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// Webhook timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Report a past day instead of today (YYYY-MM-DD; captures the full
    /// daily table rather than --today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Assemble and print the payload without sending anything
    #[arg(long)]
    pub dry_run: bool,
}

impl SendArgs {
    /// Validate argument combinations.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CurtError::ConfigInvalid`] for out-of-range
    /// values.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CurtError;

        if let Some(timeout) = self.timeout {
            if !(1..=300).contains(&timeout) {
                return Err(CurtError::ConfigInvalid {
                    key: "--timeout".to_string(),
                    value: timeout.to_string(),
                    message: "must be between 1 and 300 seconds".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Arguments for the `setup` command.
///
/// All prompts can be answered from flags, which keeps setup usable in
/// scripts and on hosts without a TTY.
#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Webhook URL to save (skips the prompt)
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Reporter name to save (skips the prompt)
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// Assume yes for the save and command-install questions
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the `doctor` command.
#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Timeout for the ccusage probe in seconds
    #[arg(long, default_value = "5")]
    pub timeout: u64,
}
