//! Installation diagnostics.
//!
//! `curt doctor` checks everything a report needs before it can ship:
//! ccusage on PATH (with a version probe), a parseable config file, a
//! configured webhook and a reporter identity. Exits non-zero when anything
//! needs attention, so the command doubles as a health probe in scripts.

use std::time::{Duration, Instant};

use crate::cli::args::DoctorArgs;
use crate::core::runner::{CcusageInvocation, run_command};
use crate::error::Result;
use crate::storage::{Config, ConfigSource, ResolvedConfig};

/// Result of a single diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed with optional details.
    Pass { details: Option<String> },
    /// Working, but worth a look.
    Warning {
        details: String,
        suggestion: Option<String>,
    },
    /// Check failed with reason and optional fix suggestion.
    Fail {
        reason: String,
        suggestion: Option<String>,
    },
}

impl CheckStatus {
    /// Whether this status requires attention (warning or worse).
    #[must_use]
    pub const fn needs_attention(&self) -> bool {
        matches!(self, Self::Warning { .. } | Self::Fail { .. })
    }
}

/// A named diagnostic check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticCheck {
    pub name: String,
    pub status: CheckStatus,
}

impl DiagnosticCheck {
    fn new(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Execute the doctor command.
pub async fn execute(args: &DoctorArgs) -> Result<()> {
    let start = Instant::now();
    let probe_timeout = Duration::from_secs(args.timeout);

    tracing::debug!(timeout_secs = args.timeout, "Starting doctor checks");

    // A broken config file fails its own check below; the remaining checks
    // then run without resolved settings rather than not at all.
    let resolved = ResolvedConfig::resolve(None).ok();

    println!("curt doctor");
    println!("{}", "-".repeat(60));

    let checks = [
        check_ccusage(resolved.as_ref(), probe_timeout).await,
        check_config_file(),
        check_webhook(resolved.as_ref()),
        check_user(resolved.as_ref()),
    ];

    for check in &checks {
        print!("{}", render_check(check));
    }

    let needs_attention = checks
        .iter()
        .filter(|check| check.status.needs_attention())
        .count();

    println!("{}", "-".repeat(60));
    println!(
        "Summary: {} ok, {} need attention [{:.1}s]",
        checks.len() - needs_attention,
        needs_attention,
        start.elapsed().as_secs_f64()
    );

    // Non-zero exit for scripting
    if needs_attention > 0 {
        std::process::exit(1);
    }

    Ok(())
}

// =============================================================================
// Checks
// =============================================================================

/// Check that the ccusage CLI is installed, probing its version.
async fn check_ccusage(config: Option<&ResolvedConfig>, timeout: Duration) -> DiagnosticCheck {
    let command = config.map_or_else(|| "ccusage".to_string(), |c| c.ccusage_command.clone());

    let invocation = match CcusageInvocation::from_command(&command) {
        Ok(invocation) => invocation,
        Err(e) => {
            return DiagnosticCheck::new(
                "ccusage installed",
                CheckStatus::Fail {
                    reason: e.to_string(),
                    suggestion: Some("fix ccusage.command in the config file".to_string()),
                },
            );
        }
    };

    match which::which(invocation.program()) {
        Ok(path) => {
            let details = match probe_version(invocation.program(), timeout).await {
                Some(version) => format!("{} at {}", version, path.display()),
                None => format!("at {}", path.display()),
            };
            DiagnosticCheck::new(
                "ccusage installed",
                CheckStatus::Pass {
                    details: Some(details),
                },
            )
        }
        Err(_) => DiagnosticCheck::new(
            "ccusage installed",
            CheckStatus::Fail {
                reason: format!("`{}` not found in PATH", invocation.program()),
                suggestion: Some("npm install -g ccusage".to_string()),
            },
        ),
    }
}

/// Get the first line of `<program> --version` output, if the probe works.
async fn probe_version(program: &str, timeout: Duration) -> Option<String> {
    let output = run_command(program, &["--version"], timeout).await.ok()?;
    if !output.success() {
        return None;
    }
    output
        .stdout
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

/// Check that the config file, if present, parses and validates.
fn check_config_file() -> DiagnosticCheck {
    let path = Config::effective_path();

    if !path.exists() {
        return DiagnosticCheck::new(
            "config file",
            CheckStatus::Pass {
                details: Some(format!("none at {} (using defaults)", path.display())),
            },
        );
    }

    match Config::load_from(&path).and_then(|config| config.validate()) {
        Ok(()) => DiagnosticCheck::new(
            "config file",
            CheckStatus::Pass {
                details: Some(path.display().to_string()),
            },
        ),
        Err(e) => DiagnosticCheck::new(
            "config file",
            CheckStatus::Fail {
                reason: e.to_string(),
                suggestion: Some(format!("fix or remove {}", path.display())),
            },
        ),
    }
}

/// Check that a webhook URL is configured somewhere.
fn check_webhook(config: Option<&ResolvedConfig>) -> DiagnosticCheck {
    let Some(config) = config else {
        return DiagnosticCheck::new(
            "webhook configured",
            CheckStatus::Fail {
                reason: "configuration could not be resolved".to_string(),
                suggestion: Some("fix the config file first".to_string()),
            },
        );
    };

    match config.webhook_url.as_deref() {
        Some(url) => DiagnosticCheck::new(
            "webhook configured",
            CheckStatus::Pass {
                details: Some(format!(
                    "{} (from {})",
                    redact_url(url),
                    config.sources.webhook_url
                )),
            },
        ),
        None => DiagnosticCheck::new(
            "webhook configured",
            CheckStatus::Fail {
                reason: "no webhook URL set".to_string(),
                suggestion: Some("run `curt setup` or set N8N_WEBHOOK_URL".to_string()),
            },
        ),
    }
}

/// Check the reporter identity a payload would carry.
fn check_user(config: Option<&ResolvedConfig>) -> DiagnosticCheck {
    let Some(config) = config else {
        return DiagnosticCheck::new(
            "reporter identity",
            CheckStatus::Warning {
                details: "configuration could not be resolved".to_string(),
                suggestion: None,
            },
        );
    };

    if config.user == "unknown" && config.sources.user == ConfigSource::Default {
        DiagnosticCheck::new(
            "reporter identity",
            CheckStatus::Warning {
                details: "no name configured and no OS account name found".to_string(),
                suggestion: Some("run `curt setup` or set CCUSAGE_USER_ID".to_string()),
            },
        )
    } else {
        DiagnosticCheck::new(
            "reporter identity",
            CheckStatus::Pass {
                details: Some(format!("{} (from {})", config.user, config.sources.user)),
            },
        )
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Render one check as its output lines.
fn render_check(check: &DiagnosticCheck) -> String {
    let mut output = String::new();

    match &check.status {
        CheckStatus::Pass { details } => {
            output.push_str(&format!("{} {}", glyph(&check.status), check.name));
            if let Some(details) = details {
                output.push_str(&format!("  {details}"));
            }
            output.push('\n');
        }
        CheckStatus::Warning {
            details: text,
            suggestion,
        }
        | CheckStatus::Fail {
            reason: text,
            suggestion,
        } => {
            output.push_str(&format!("{} {}\n", glyph(&check.status), check.name));
            output.push_str(&format!("    {text}\n"));
            if let Some(suggestion) = suggestion {
                output.push_str(&format!("    -> {suggestion}\n"));
            }
        }
    }

    output
}

/// Status glyph for a check line.
const fn glyph(status: &CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass { .. } => "\u{2713}",    // ✓
        CheckStatus::Warning { .. } => "\u{26a0}", // ⚠
        CheckStatus::Fail { .. } => "\u{2717}",    // ✗
    }
}

/// Show the webhook endpoint without its path, which n8n treats as a secret.
fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    match url[scheme_end + 3..].find('/') {
        Some(path_start) => format!("{}/...", &url[..scheme_end + 3 + path_start]),
        None => url.to_string(),
    }
}
