//! Error types for curt.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into five main categories:
//! - **Configuration**: Config file parsing, validation, or missing values
//! - **Network**: Connection, timeout, or webhook delivery issues
//! - **Environment**: Missing tools or failed child processes
//! - **Usage**: No usage data for the requested day
//! - **Internal**: Unexpected errors, bugs, or unclassified issues
//!
//! Each error has a stable error code (e.g., `CURT-C001`) for programmatic handling.
//!
//! Note that a day with no usage row is a first-class outcome of the parser
//! (`found = false`), not an error; it only becomes [`CurtError::UsageNotFound`]
//! when a command needs a record and none exists. The variant always carries
//! the date that was looked for.
//!
//! ## Fix Suggestions
//!
//! Each error type can provide actionable fix suggestions via the
//! [`CurtError::fix_suggestions()`] method. Suggestions include:
//! - Commands to run (copy-paste ready)
//! - Context explaining why the error occurred
//! - Prevention tips for the future
//! - Documentation links when available

pub mod suggestions;

use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
///
/// Used to determine fix suggestions and error handling strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration issues (parse errors, invalid values, missing settings).
    Configuration,
    /// Network issues (timeout, connection, webhook rejection).
    Network,
    /// Environment issues (missing CLIs, failed child processes).
    Environment,
    /// Usage data issues (no row for the requested day).
    Usage,
    /// Internal errors (bugs, unexpected state, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Network => "Network error",
            Self::Environment => "Environment error",
            Self::Usage => "Usage data error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Configuration => "C",
            Self::Network => "N",
            Self::Environment => "E",
            Self::Usage => "U",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// ccusage (or another required binary) not installed
    BinaryNotFound = 2,
    /// Config errors, missing settings, or no usage data for the day
    ParseError = 3,
    /// Timeout
    Timeout = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for curt operations.
///
/// Each variant has:
/// - A stable error code (e.g., `CURT-C001`)
/// - A category for classification
/// - A retryable flag for retry logic
#[derive(Error, Debug)]
pub enum CurtError {
    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// No webhook URL available from flags, environment, or config file.
    #[error("webhook URL is not configured")]
    WebhookNotConfigured,

    /// Error parsing the configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse {
        path: String,
        message: String,
    },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid {
        key: String,
        value: String,
        message: String,
    },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    // ==========================================================================
    // Network errors (Category: Network)
    // ==========================================================================
    /// Request timed out after the specified duration.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Generic network failure.
    #[error("network error: {0}")]
    Network(String),

    /// The webhook endpoint answered with a non-success status.
    #[error("webhook rejected the report: HTTP {status}")]
    WebhookRejected {
        status: u16,
        body: String,
    },

    // ==========================================================================
    // Environment errors (Category: Environment)
    // ==========================================================================
    /// Required CLI tool not found in PATH.
    #[error("CLI tool not found: {name}")]
    CliNotFound {
        name: String,
    },

    /// Child process exited unsuccessfully.
    #[error("{name} failed with exit code {code:?}")]
    CliFailed {
        name: String,
        code: Option<i32>,
        stderr: String,
    },

    // ==========================================================================
    // Usage data errors (Category: Usage)
    // ==========================================================================
    /// No usage row matched the requested date. Absence, not zero usage.
    #[error("no usage data found for {date}")]
    UsageNotFound {
        date: String,
    },

    // ==========================================================================
    // Internal errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MCP transport or protocol failure.
    #[error("MCP server error: {0}")]
    Mcp(String),
}

impl CurtError {
    /// Map error to a process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::CliNotFound { .. } => ExitCode::BinaryNotFound,

            Self::WebhookNotConfigured
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::Config(_)
            | Self::UsageNotFound { .. } => ExitCode::ParseError,

            Self::Timeout(_) => ExitCode::Timeout,

            Self::Network(_)
            | Self::WebhookRejected { .. }
            | Self::CliFailed { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Mcp(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::WebhookNotConfigured
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::Config(_) => ErrorCategory::Configuration,

            Self::Timeout(_)
            | Self::Network(_)
            | Self::WebhookRejected { .. } => ErrorCategory::Network,

            Self::CliNotFound { .. }
            | Self::CliFailed { .. } => ErrorCategory::Environment,

            Self::UsageNotFound { .. } => ErrorCategory::Usage,

            Self::Io(_)
            | Self::Json(_)
            | Self::Mcp(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `CURT-{category}{number}` where category is:
    /// - C: Configuration
    /// - N: Network
    /// - E: Environment
    /// - U: Usage
    /// - X: Internal
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            // Configuration errors (C001-C099)
            Self::WebhookNotConfigured => "CURT-C001",
            Self::ConfigParse { .. } => "CURT-C002",
            Self::ConfigInvalid { .. } => "CURT-C003",
            Self::Config(_) => "CURT-C004",

            // Network errors (N001-N099)
            Self::Timeout(_) => "CURT-N001",
            Self::Network(_) => "CURT-N002",
            Self::WebhookRejected { .. } => "CURT-N010",

            // Environment errors (E001-E099)
            Self::CliNotFound { .. } => "CURT-E001",
            Self::CliFailed { .. } => "CURT-E002",

            // Usage data errors (U001-U099)
            Self::UsageNotFound { .. } => "CURT-U001",

            // Internal errors (X001-X099)
            Self::Io(_) => "CURT-X001",
            Self::Json(_) => "CURT-X002",
            Self::Mcp(_) => "CURT-X003",
        }
    }

    /// Returns whether the error is potentially recoverable by retrying.
    ///
    /// Retryable errors include timeouts, transient network failures, and
    /// webhook 5xx responses. A 4xx rejection or a missing setting will not
    /// improve on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::WebhookRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns actionable fix suggestions for this error.
    ///
    /// Suggestions include commands to run, context about why the error
    /// occurred, prevention tips, and documentation links when available.
    ///
    /// # Example
    ///
    /// ```
    /// use curt::error::CurtError;
    ///
    /// let err = CurtError::CliNotFound { name: "ccusage".to_string() };
    /// let suggestions = err.fix_suggestions();
    ///
    /// if !suggestions.is_empty() {
    ///     println!("Try these commands:");
    ///     for cmd in &suggestions[0].commands {
    ///         println!("  {}", cmd);
    ///     }
    /// }
    /// ```
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            // Configuration errors
            Self::WebhookNotConfigured => suggestions::webhook_not_configured_suggestions(),
            Self::ConfigParse { path, message } => {
                suggestions::config_parse_suggestions(path, message)
            }
            Self::ConfigInvalid { key, value, message } => {
                suggestions::config_invalid_suggestions(key, value, message)
            }
            Self::Config(msg) => {
                vec![FixSuggestion::new(
                    vec!["curt doctor".to_string()],
                    format!("Configuration error: {}", msg),
                )]
            }

            // Network errors
            Self::Timeout(seconds) => suggestions::timeout_suggestions(*seconds),
            Self::Network(msg) => {
                vec![FixSuggestion::new(
                    vec!["curt doctor".to_string()],
                    format!("Network error: {}. Check your internet connection.", msg),
                )]
            }
            Self::WebhookRejected { status, body } => {
                suggestions::webhook_rejected_suggestions(*status, body)
            }

            // Environment errors
            Self::CliNotFound { name } => suggestions::cli_not_found_suggestions(name),
            Self::CliFailed { name, code, stderr } => {
                suggestions::cli_failed_suggestions(name, *code, stderr)
            }

            // Usage data errors
            Self::UsageNotFound { date } => suggestions::usage_not_found_suggestions(date),

            // Internal errors - generic suggestions
            Self::Io(err) => {
                vec![FixSuggestion::new(
                    vec!["# Check file permissions and disk space".to_string()],
                    format!(
                        "I/O error: {}. Check file permissions and available disk space.",
                        err
                    ),
                )]
            }
            Self::Json(err) => {
                vec![FixSuggestion::new(
                    vec!["curt doctor".to_string()],
                    format!(
                        "JSON error: {}. The data may be corrupted or in an unexpected format.",
                        err
                    ),
                )]
            }
            Self::Mcp(msg) => {
                vec![FixSuggestion::new(
                    vec!["curt serve".to_string()],
                    format!(
                        "MCP server error: {}. Check the client's MCP configuration and restart.",
                        msg
                    ),
                )]
            }
        }
    }
}

/// Result type alias for curt operations.
pub type Result<T> = std::result::Result<T, CurtError>;

// =============================================================================
// Tests
// =============================================================================
