//! MCP stdio server.
//!
//! Exposes the send pipeline as a Model Context Protocol tool so a coding
//! agent can report its own usage. One tool is served: `send-usage`, with an
//! optional `note` argument. stdout belongs to the protocol; logging stays
//! on stderr (see [`crate::core::logging`]).
//!
//! Configuration is resolved per call, not at startup, so the operator can
//! fix a missing webhook URL without restarting the server.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use serde::Deserialize;

use crate::core::pipeline;
// The crate's one-parameter Result alias must stay out of scope here: the
// rmcp macros expand methods returning a two-parameter `Result`.
use crate::error::CurtError;
use crate::storage::ResolvedConfig;

/// Arguments accepted by the `send-usage` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SendUsageArgs {
    /// Optional note or comment about the usage
    pub note: Option<String>,
}

/// The curt MCP server.
#[derive(Clone)]
pub struct UsageServer {
    tool_router: ToolRouter<Self>,
}

impl Default for UsageServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl UsageServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "send-usage",
        description = "Send today's Claude token usage to the team spreadsheet via n8n"
    )]
    async fn send_usage(
        &self,
        Parameters(args): Parameters<SendUsageArgs>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let config = ResolvedConfig::resolve(None).map_err(|e| to_mcp_error(&e))?;
        let note = args.note.unwrap_or_default();

        let outcome = pipeline::send_usage(&config, &note, None, false)
            .await
            .map_err(|e| to_mcp_error(&e))?;

        Ok(CallToolResult::success(vec![Content::text(
            outcome.summary(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for UsageServer {
    fn get_info(&self) -> ServerInfo {
        // ServerInfo is non_exhaustive, so mutate a default instead of using
        // struct-update syntax.
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = Implementation::from_build_env();
        info.instructions = Some(
            "Reports the current day's Claude token usage to the team's n8n \
             webhook. Call send-usage after a work session, optionally with a \
             note describing what the usage was for. Per-model token counts in \
             the report are approximate: every model used that day is credited \
             the day's total."
                .to_string(),
        );
        info
    }
}

/// Map a pipeline error onto the MCP wire, keeping the stable error code
/// and retryability as structured data.
fn to_mcp_error(err: &CurtError) -> McpError {
    McpError::internal_error(
        err.to_string(),
        Some(serde_json::json!({
            "code": err.error_code(),
            "retryable": err.is_retryable(),
        })),
    )
}

/// Serve MCP over stdio until the client disconnects.
///
/// # Errors
///
/// Returns [`CurtError::Mcp`] if the transport fails to start or tears down
/// uncleanly.
pub async fn serve_stdio() -> crate::error::Result<()> {
    tracing::info!("Starting MCP server on stdio");

    let service = UsageServer::new()
        .serve(stdio())
        .await
        .map_err(|e| CurtError::Mcp(e.to_string()))?;

    service
        .waiting()
        .await
        .map_err(|e| CurtError::Mcp(e.to_string()))?;

    tracing::info!("MCP client disconnected");
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
