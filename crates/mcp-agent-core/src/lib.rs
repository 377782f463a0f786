//! MCP Agent Core
//!
//! A conversational agent that answers with an OpenAI-compatible model and
//! calls tools hosted on remote MCP servers. The model decides per round,
//! inside one streamed completion, whether it is answering or calling tools;
//! the agent forwards text as it arrives and runs tool rounds in between.
//!
//! ## Layout
//!
//! - `config`: settings from the environment and the `mcp.json` server list
//! - `mcp`: sessions with remote tool servers (rmcp, streamable HTTP)
//! - `tools`: one registry over remote and in-process tools
//! - `providers`: streaming chat backends (genai, mock)
//! - `agent`: the arbitration loop and the `McpAgent` entry point
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use mcp_agent_core::{ConsoleLogger, McpAgent};
//!
//! let mut agent = McpAgent::from_env(Arc::new(ConsoleLogger::new()));
//! if agent.initialize().await {
//!     let mut events = agent.chat_stream("What time is it in Tokyo?", &[], None);
//!     while let Some(event) = events.next().await {
//!         println!("{}", serde_json::to_string(&event)?);
//!     }
//! }
//! agent.close().await;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod providers;
pub mod mcp;
pub mod tools;
pub mod agent;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageRole, MessageContent,
    Tool, ToolCall,
    StreamChunk, AgentEvent,
    CancellationToken,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, MemoryLogger};

pub use config::{AgentSettings, ConfigError, ConfigStore, McpConfig, ServerConfig};

pub use providers::{create_provider, ModelClient, Provider, ProviderError};

pub use mcp::{McpClient, McpError, McpResult, McpTool, McpToolResult};

pub use tools::{FunctionTool, ToolHandle, ToolRegistry, ToolsInfo};

pub use agent::{AgentError, AgentOptions, HistoryTurn, McpAgent, ToolConflictPolicy};
