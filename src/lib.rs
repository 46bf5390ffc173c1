//! curt - Claude Usage Relay Tool
//!
//! Runs `ccusage` to capture today's Claude Code token usage, parses its
//! daily table, and relays a report to an n8n webhook. Usable as a one-shot
//! CLI (`curt send`) or as an MCP stdio server exposing a `send-usage` tool.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unused_async)]

pub mod cli;
pub mod core;
pub mod error;
pub mod mcp;
pub mod storage;
pub mod util;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{CurtError, ExitCode, Result};

// Re-export test utilities for external test crates
#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::*;
