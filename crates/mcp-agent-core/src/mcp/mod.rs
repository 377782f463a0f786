//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to talk to remote tool servers over streamable
//! HTTP, plus a plain reachability probe used for startup diagnostics.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_agent_core::mcp::McpClient;
//!
//! let client = McpClient::connect_http("weather", "http://localhost:8000/mcp", logger).await?;
//! let tools = client.list_tools().await?;
//! let result = client.call_tool("get_forecast", args).await?;
//! ```

mod client;
mod probe;

pub use client::{result_text, McpClient, McpError, McpResult, SUPPORTED_TRANSPORTS};
pub use probe::{probe_server, ProbeOutcome, PROBE_TIMEOUT};

pub use rmcp::model::{CallToolResult as McpToolResult, Tool as McpTool};
