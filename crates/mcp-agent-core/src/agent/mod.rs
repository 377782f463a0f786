//! Agent loop
//!
//! `McpAgent` owns the settings, the tool registry, the model clients and
//! the MCP sessions. `chat_stream` runs the arbitration loop in `arbiter`,
//! which decides round by round, from the model's stream alone, whether the
//! model is answering or calling tools.

mod arbiter;
mod mcp_agent;
mod prompt;
mod round;
mod session;
mod transcript;

pub use arbiter::{AgentOptions, DEFAULT_MAX_ROUNDS, GENERATING_STATUS, ROUNDS_EXHAUSTED_TEXT};
pub use mcp_agent::{AgentError, McpAgent, DEFAULT_SESSION_ID};
pub use prompt::{tool_arbitration_prompt, tool_arbitration_prompt_at};
pub use round::{FragmentAction, RoundDecision, RoundMachine, RoundState, ToolConflictPolicy};
pub use session::{SessionContext, SessionContexts};
pub use transcript::{HistoryTurn, Transcript, DEFAULT_HISTORY_LIMIT};
