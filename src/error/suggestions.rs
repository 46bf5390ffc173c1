//! Fix suggestion database for curt errors.
//!
//! Provides actionable fix suggestions mapped to specific error types,
//! including commands, context explanations, and prevention tips.

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
///
/// Contains actionable information to help users resolve errors.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Primary fix commands in order of preference.
    /// These should be copy-paste ready for the terminal.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    /// Should help users understand the root cause.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,

    /// Link to documentation for more information.
    pub doc_url: Option<String>,

    /// Whether this can potentially be auto-fixed.
    pub auto_fixable: bool,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
            doc_url: None,
            auto_fixable: false,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }

    /// Builder: adds documentation URL.
    #[must_use]
    pub fn with_doc_url(mut self, url: impl Into<String>) -> Self {
        self.doc_url = Some(url.into());
        self
    }

    /// Builder: marks as auto-fixable.
    #[must_use]
    pub const fn auto_fixable(mut self) -> Self {
        self.auto_fixable = true;
        self
    }
}

// =============================================================================
// CLI Installation Helpers
// =============================================================================

/// Returns installation commands for a CLI tool.
#[must_use]
pub fn install_commands_for_cli(name: &str) -> Vec<String> {
    match name.to_lowercase().as_str() {
        "ccusage" => vec![
            "npm install -g ccusage".to_string(),
            "bun add -g ccusage".to_string(),
            "# Or run without installing: npx ccusage@latest daily".to_string(),
        ],
        "node" | "npm" => vec![
            "brew install node".to_string(),
            "# Or download from: https://nodejs.org".to_string(),
        ],
        _ => vec![format!(
            "# Install {} following its official documentation",
            name
        )],
    }
}

/// Returns documentation URL for a CLI tool.
#[must_use]
pub fn install_doc_for_cli(name: &str) -> Option<String> {
    match name.to_lowercase().as_str() {
        "ccusage" => Some("https://ccusage.com".to_string()),
        "node" | "npm" => Some("https://nodejs.org/en/download".to_string()),
        _ => None,
    }
}

// =============================================================================
// Suggestion Generators
// =============================================================================

/// Generates fix suggestions when no webhook URL is configured anywhere.
#[must_use]
pub fn webhook_not_configured_suggestions() -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["curt setup".to_string()],
            "No webhook URL was found in flags, environment, or the config file. \
             curt needs a destination to deliver usage reports to.",
        )
        .with_prevention(
            "Run `curt setup` once per machine; the saved config makes every \
             later send work without flags.",
        )
        .auto_fixable(),
        FixSuggestion::new(
            vec![
                "export N8N_WEBHOOK_URL=\"https://n8n.example.com/webhook/usage\"".to_string(),
                "curt send --webhook-url https://n8n.example.com/webhook/usage".to_string(),
            ],
            "For one-off runs or CI, the URL can come from the environment or a \
             flag instead of the config file.",
        ),
    ]
}

/// Generates fix suggestions for config parse errors.
#[must_use]
pub fn config_parse_suggestions(path: &str, message: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("$EDITOR {}", path), "curt setup".to_string()],
            format!(
                "The config file has a syntax error. The TOML parser reported: {}",
                message
            ),
        )
        .with_prevention(
            "Use a TOML-aware editor with syntax highlighting, or regenerate the \
             file with `curt setup`.",
        ),
    ]
}

/// Generates fix suggestions for invalid config value errors.
#[must_use]
pub fn config_invalid_suggestions(key: &str, value: &str, message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["curt setup".to_string(), "curt doctor".to_string()],
        format!(
            "Invalid config value for '{}': '{}'. {}",
            key, value, message
        ),
    )]
}

/// Generates fix suggestions for timeout errors.
#[must_use]
pub fn timeout_suggestions(seconds: u64) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![
                format!("curt send --timeout {}", seconds * 2),
                "curt doctor".to_string(),
            ],
            format!(
                "The operation did not finish within {}s. The webhook host may be \
                 slow, or ccusage may be scanning a very large log history.",
                seconds
            ),
        )
        .with_prevention(
            "Increase the timeout with `--timeout` or set timeout_secs in the \
             config file if your network is consistently slow.",
        ),
    ]
}

/// Generates fix suggestions when the webhook endpoint rejects a report.
#[must_use]
pub fn webhook_rejected_suggestions(status: u16, body: &str) -> Vec<FixSuggestion> {
    let mut context = format!("The webhook endpoint answered HTTP {}.", status);
    if !body.is_empty() {
        let snippet: String = body.chars().take(200).collect();
        context.push_str(&format!(" Response body: {}", snippet));
    }

    match status {
        404 => vec![
            FixSuggestion::new(
                vec!["curt setup".to_string()],
                format!(
                    "{} The URL points at nothing; in n8n this usually means the \
                     workflow is inactive or its webhook path changed.",
                    context
                ),
            )
            .with_prevention(
                "Activate the n8n workflow and copy its production webhook URL \
                 into `curt setup`.",
            ),
        ],
        401 | 403 => vec![FixSuggestion::new(
            vec!["curt setup".to_string()],
            format!(
                "{} The endpoint requires credentials that curt is not sending.",
                context
            ),
        )],
        _ if status >= 500 => vec![FixSuggestion::new(
            vec!["curt send".to_string()],
            format!("{} This is usually transient; retrying often succeeds.", context),
        )],
        _ => vec![FixSuggestion::new(
            vec!["curt doctor".to_string()],
            context,
        )],
    }
}

/// Generates fix suggestions for CLI not found errors.
#[must_use]
pub fn cli_not_found_suggestions(name: &str) -> Vec<FixSuggestion> {
    let commands = install_commands_for_cli(name);
    let doc_url = install_doc_for_cli(name);

    let mut suggestion = FixSuggestion::new(
        commands,
        format!(
            "The {} CLI tool is not installed or not in PATH. curt reads usage \
             data from its output.",
            name
        ),
    )
    .with_prevention(format!(
        "Install {} globally, or point ccusage.command in the config file at \
         the binary.",
        name
    ));

    if let Some(url) = doc_url {
        suggestion = suggestion.with_doc_url(url);
    }

    vec![suggestion]
}

/// Generates fix suggestions when a child process exits unsuccessfully.
#[must_use]
pub fn cli_failed_suggestions(name: &str, code: Option<i32>, stderr: &str) -> Vec<FixSuggestion> {
    let code_info = code.map_or_else(
        || "was killed by a signal".to_string(),
        |c| format!("exited with code {}", c),
    );

    let mut context = format!("'{}' {}.", name, code_info);
    if !stderr.is_empty() {
        let snippet: String = stderr.chars().take(300).collect();
        context.push_str(&format!(" stderr: {}", snippet));
    }

    vec![
        FixSuggestion::new(
            vec![format!("{} daily", name), "curt doctor".to_string()],
            context,
        )
        .with_prevention(format!(
            "Run {} directly to see its full output and error messages.",
            name
        )),
    ]
}

/// Generates fix suggestions when no usage row exists for the requested date.
#[must_use]
pub fn usage_not_found_suggestions(date: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["ccusage daily".to_string()],
            format!(
                "ccusage produced no row for {}. Either Claude Code was not used \
                 that day, or its local logs have not been written yet.",
                date
            ),
        )
        .with_prevention(
            "Check `ccusage daily` yourself before sending; curt reports exactly \
             what that table shows.",
        ),
    ]
}

// =============================================================================
// Tests
// =============================================================================
