//! ccusage subprocess execution.
//!
//! Runs the configured ccusage command with `--today`, captures its output
//! for the parser, and enforces a timeout so a wedged child cannot hang a
//! report.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{CurtError, Result};

/// Only the current day's table is wanted.
const TODAY_FLAG: &str = "--today";

// =============================================================================
// Invocation
// =============================================================================

/// The ccusage invocation resolved from configuration.
///
/// The configured command may carry leading arguments (`bunx ccusage`,
/// `npx ccusage@latest`): the first word names the program and the rest
/// prefix the argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcusageInvocation {
    program: String,
    args: Vec<String>,
}

impl CcusageInvocation {
    /// Split a configured command string into program and leading arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CurtError::Config`] when the command is blank.
    pub fn from_command(command: &str) -> Result<Self> {
        let mut words = command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| CurtError::Config("ccusage command is empty".to_string()))?
            .to_string();

        Ok(Self {
            program,
            args: words.map(str::to_string).collect(),
        })
    }

    /// Program name, for availability checks and error reporting.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether the program resolves on `PATH`.
    #[must_use]
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Run `<command> --today` and return the captured table text.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The program is not installed ([`CurtError::CliNotFound`])
    /// - The run exceeds the timeout ([`CurtError::Timeout`])
    /// - The child exits unsuccessfully ([`CurtError::CliFailed`])
    pub async fn capture_today(&self, timeout_duration: Duration) -> Result<String> {
        self.capture(&[TODAY_FLAG], timeout_duration).await
    }

    /// Run the bare command for the full daily table. Used when reporting a
    /// past day, which `--today` output cannot contain.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::capture_today`].
    pub async fn capture_full(&self, timeout_duration: Duration) -> Result<String> {
        self.capture(&[], timeout_duration).await
    }

    async fn capture(&self, extra: &[&str], timeout_duration: Duration) -> Result<String> {
        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        args.extend_from_slice(extra);

        let output = run_command(&self.program, &args, timeout_duration).await?;
        if !output.success() {
            return Err(CurtError::CliFailed {
                name: self.program.clone(),
                code: output.signal_free_code(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

// =============================================================================
// Subprocess Runner
// =============================================================================

/// Output from a finished child process.
#[derive(Debug)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CliOutput {
    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// The exit code, with the signal-death sentinel (-1) mapped to `None`.
    #[must_use]
    pub const fn signal_free_code(&self) -> Option<i32> {
        if self.exit_code == -1 {
            None
        } else {
            Some(self.exit_code)
        }
    }
}

/// Run a command with a timeout, capturing both output streams.
///
/// Children run with `NO_COLOR` set so tables arrive mostly plain; the
/// parser strips any escape codes that slip through anyway.
///
/// # Errors
///
/// Returns error if:
/// - The program is missing from `PATH`
/// - The command times out (the child is killed first)
/// - Spawning or reading the child fails
pub async fn run_command(
    program: &str,
    args: &[&str],
    timeout_duration: Duration,
) -> Result<CliOutput> {
    let mut child = Command::new(program)
        .args(args)
        .env("NO_COLOR", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CurtError::CliNotFound {
                    name: program.to_string(),
                }
            } else {
                CurtError::CliFailed {
                    name: program.to_string(),
                    code: None,
                    stderr: e.to_string(),
                }
            }
        })?;

    let result = timeout(timeout_duration, async {
        // Read stdout and stderr concurrently to avoid deadlock.
        // If we read them sequentially and the child writes a lot to one stream,
        // its pipe buffer can fill up while we're waiting on the other stream,
        // causing the child to block and creating a deadlock.
        let stdout_handle = async {
            let mut stdout = String::new();
            if let Some(mut out) = child.stdout.take() {
                out.read_to_string(&mut stdout).await?;
            }
            Ok::<_, std::io::Error>(stdout)
        };

        let stderr_handle = async {
            let mut stderr = String::new();
            if let Some(mut err) = child.stderr.take() {
                err.read_to_string(&mut stderr).await?;
            }
            Ok::<_, std::io::Error>(stderr)
        };

        let (stdout_result, stderr_result) = tokio::join!(stdout_handle, stderr_handle);
        let stdout = stdout_result?;
        let stderr = stderr_result?;

        let status = child.wait().await?;

        Ok::<_, std::io::Error>(CliOutput {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(-1),
        })
    })
    .await;

    match result {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(CurtError::CliFailed {
            name: program.to_string(),
            code: None,
            stderr: e.to_string(),
        }),
        Err(_) => {
            // Timeout - kill the process before reporting.
            let _ = child.kill().await;
            let _ = child.wait().await;
            Err(CurtError::Timeout(timeout_duration.as_secs()))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
