//! Environment detection utilities.

use std::io::IsTerminal;

/// Check if stdin is a TTY.
#[must_use]
pub fn stdin_is_tty() -> bool {
    std::io::stdin().is_terminal()
}

/// Check if stderr is a TTY.
#[must_use]
pub fn stderr_is_tty() -> bool {
    std::io::stderr().is_terminal()
}

/// Check if an interactive session is possible.
///
/// Prompts are written to stderr and answers read from stdin, so both must
/// be terminals.
#[must_use]
pub fn is_interactive() -> bool {
    stdin_is_tty() && stderr_is_tty()
}
