//! Serve command implementation.

use crate::error::Result;
use crate::mcp;

/// Run the MCP stdio server until the client disconnects.
///
/// # Errors
///
/// Returns [`crate::error::CurtError::Mcp`] on transport failure.
pub async fn execute() -> Result<()> {
    mcp::serve_stdio().await
}
