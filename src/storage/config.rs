//! Configuration file loading and management.
//!
//! Loads configuration from:
//! - Linux/macOS: `~/.config/curt/config.toml`
//! - Windows: `%APPDATA%/curt/config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `N8N_WEBHOOK_URL`: Webhook endpoint to deliver reports to
//! - `CCUSAGE_USER_ID`: Reporter name attached to each payload
//! - `CURT_CONFIG`: Override config file path

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::cli::args::SendArgs;
use crate::error::{CurtError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable for the webhook endpoint URL.
pub const ENV_WEBHOOK_URL: &str = "N8N_WEBHOOK_URL";
/// Environment variable for the reporter name.
pub const ENV_USER_ID: &str = "CCUSAGE_USER_ID";
/// Environment variable to override the config file path.
pub const ENV_CONFIG: &str = "CURT_CONFIG";

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration after merging CLI, env vars, and config file.
///
/// This struct represents the final, validated configuration to be used by
/// the send pipeline. All values have been resolved according to the
/// precedence rules. Note that the webhook URL stays optional here; commands
/// that need one call [`ResolvedConfig::require_webhook_url`].
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Webhook endpoint URL, if any source provided one.
    pub webhook_url: Option<String>,
    /// Reporter name attached to payloads.
    pub user: String,
    /// Webhook request timeout.
    pub webhook_timeout: Duration,
    /// Command used to invoke ccusage.
    pub ccusage_command: String,
    /// Timeout for the ccusage child process.
    pub ccusage_timeout: Duration,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub webhook_url: ConfigSource,
    pub user: ConfigSource,
    pub webhook_timeout: ConfigSource,
    pub ccusage_command: ConfigSource,
    pub ccusage_timeout: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and
    /// config file.
    ///
    /// # Precedence
    ///
    /// 1. CLI flags (highest priority)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Built-in defaults (lowest priority)
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is invalid.
    pub fn resolve(send_args: Option<&SendArgs>) -> Result<Self> {
        let config = Self::load_config()?;
        config.validate()?;

        let mut sources = ConfigSources::default();

        let webhook_url = Self::resolve_webhook_url(send_args, &config, &mut sources.webhook_url);
        let user = Self::resolve_user(send_args, &config, &mut sources.user);
        let webhook_timeout =
            Self::resolve_webhook_timeout(send_args, &config, &mut sources.webhook_timeout);
        let ccusage_command = Self::resolve_ccusage_command(&config, &mut sources.ccusage_command);
        let ccusage_timeout = Self::resolve_ccusage_timeout(&config, &mut sources.ccusage_timeout);

        Ok(Self {
            webhook_url,
            user,
            webhook_timeout,
            ccusage_command,
            ccusage_timeout,
            sources,
        })
    }

    /// Returns the webhook URL or the error that tells the user how to set one.
    pub fn require_webhook_url(&self) -> Result<&str> {
        self.webhook_url
            .as_deref()
            .ok_or(CurtError::WebhookNotConfigured)
    }

    /// Load config file, respecting the CURT_CONFIG override.
    fn load_config() -> Result<Config> {
        Config::load_from(&Config::effective_path())
    }

    /// Resolve the webhook URL setting.
    fn resolve_webhook_url(
        send_args: Option<&SendArgs>,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Option<String> {
        // 1. CLI flag
        if let Some(args) = send_args {
            if let Some(ref url) = args.webhook_url {
                *source = ConfigSource::Cli;
                return Some(url.clone());
            }
        }

        // 2. Environment variable
        if let Ok(url) = std::env::var(ENV_WEBHOOK_URL) {
            if !url.trim().is_empty() {
                *source = ConfigSource::Env;
                return Some(url.trim().to_string());
            }
        }

        // 3. Config file
        if let Some(ref url) = config.webhook.url {
            *source = ConfigSource::ConfigFile;
            return Some(url.clone());
        }

        // 4. Default: none
        *source = ConfigSource::Default;
        None
    }

    /// Resolve the reporter name.
    ///
    /// Falls back to the OS account name when nothing else is set, so every
    /// payload carries some identity.
    fn resolve_user(
        send_args: Option<&SendArgs>,
        config: &Config,
        source: &mut ConfigSource,
    ) -> String {
        // 1. CLI flag
        if let Some(args) = send_args {
            if let Some(ref user) = args.user {
                *source = ConfigSource::Cli;
                return user.clone();
            }
        }

        // 2. Environment variable
        if let Ok(user) = std::env::var(ENV_USER_ID) {
            if !user.trim().is_empty() {
                *source = ConfigSource::Env;
                return user.trim().to_string();
            }
        }

        // 3. Config file
        if let Some(ref user) = config.report.user {
            *source = ConfigSource::ConfigFile;
            return user.clone();
        }

        // 4. Default: OS account name
        *source = ConfigSource::Default;
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Resolve the webhook request timeout.
    fn resolve_webhook_timeout(
        send_args: Option<&SendArgs>,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Duration {
        // 1. CLI --timeout flag
        if let Some(args) = send_args {
            if let Some(timeout) = args.timeout {
                *source = ConfigSource::Cli;
                return Duration::from_secs(timeout);
            }
        }

        // 2. Config file (or the built-in default baked into it)
        *source = if config.webhook.timeout_secs == WebhookConfig::default().timeout_secs {
            ConfigSource::Default
        } else {
            ConfigSource::ConfigFile
        };
        Duration::from_secs(config.webhook.timeout_secs)
    }

    /// Resolve the ccusage invocation command.
    fn resolve_ccusage_command(config: &Config, source: &mut ConfigSource) -> String {
        if config.ccusage.command == CcusageConfig::default().command {
            *source = ConfigSource::Default;
        } else {
            *source = ConfigSource::ConfigFile;
        }
        config.ccusage.command.clone()
    }

    /// Resolve the ccusage child process timeout.
    fn resolve_ccusage_timeout(config: &Config, source: &mut ConfigSource) -> Duration {
        if config.ccusage.timeout_secs == CcusageConfig::default().timeout_secs {
            *source = ConfigSource::Default;
        } else {
            *source = ConfigSource::ConfigFile;
        }
        Duration::from_secs(config.ccusage.timeout_secs)
    }
}

// =============================================================================
// Config File Schema
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Webhook delivery settings.
    pub webhook: WebhookConfig,
    /// Report payload settings.
    pub report: ReportConfig,
    /// ccusage invocation settings.
    pub ccusage: CcusageConfig,
}

/// Webhook delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Endpoint URL reports are POSTed to.
    pub url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Report payload settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Reporter name attached to each payload.
    pub user: Option<String>,
}

/// ccusage invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CcusageConfig {
    /// Command used to invoke ccusage (a name looked up in PATH or an
    /// absolute path).
    pub command: String,
    /// Child process timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook: WebhookConfig::default(),
            report: ReportConfig::default(),
            ccusage: CcusageConfig::default(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 30,
        }
    }
}

impl Default for CcusageConfig {
    fn default() -> Self {
        Self {
            command: "ccusage".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from the default config file path.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error only if the file exists but is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error only if the file exists but is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| CurtError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save configuration to the default config file path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CurtError::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(path, content)?;
        tracing::debug!(?path, "Config file saved");
        Ok(())
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_path() -> std::path::PathBuf {
        AppPaths::new().config_file()
    }

    /// The path configuration is read from and saved to, honoring the
    /// `CURT_CONFIG` override.
    #[must_use]
    pub fn effective_path() -> std::path::PathBuf {
        std::env::var(ENV_CONFIG).map_or_else(|_| Self::config_path(), std::path::PathBuf::from)
    }

    /// Validate configuration values.
    ///
    /// Checks that:
    /// - The webhook URL (if set) is an http(s) URL
    /// - Timeouts are within reasonable bounds (1-300 seconds)
    /// - The ccusage command is not empty
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.webhook.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CurtError::ConfigInvalid {
                    key: "webhook.url".to_string(),
                    value: url.clone(),
                    message: "must be an http:// or https:// URL".to_string(),
                });
            }
        }

        for (key, secs) in [
            ("webhook.timeout_secs", self.webhook.timeout_secs),
            ("ccusage.timeout_secs", self.ccusage.timeout_secs),
        ] {
            if secs == 0 || secs > 300 {
                return Err(CurtError::ConfigInvalid {
                    key: key.to_string(),
                    value: secs.to_string(),
                    message: "must be between 1 and 300 seconds".to_string(),
                });
            }
        }

        if self.ccusage.command.trim().is_empty() {
            return Err(CurtError::ConfigInvalid {
                key: "ccusage.command".to_string(),
                value: self.ccusage.command.clone(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
