//! Events streamed from the agent loop to the presentation layer

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shown while a reply is being produced
pub const RESPONSE_START_TEXT: &str = "AI is replying...";

/// One event of a chat turn
///
/// Per round that does not call tools there is exactly one
/// `AiResponseStart`/`AiResponseEnd` pair; per invoked tool there is one
/// `ToolStart` followed by exactly one of `ToolEnd`/`ToolError`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Progress notice
    Status {
        content: String,
    },
    /// A reply begins
    AiResponseStart {
        content: String,
    },
    /// A fragment of the reply
    AiResponseChunk {
        content: String,
    },
    /// The reply is complete; `content` is the full text
    AiResponseEnd {
        content: String,
    },
    /// Text already forwarded this round turned out to precede tool calls and
    /// should be discarded by the consumer
    AiResponseRetracted {
        content: String,
    },
    /// The model decided to call tools
    ToolPlan {
        content: String,
        tool_count: usize,
    },
    /// A tool is about to run
    ToolStart {
        tool_id: String,
        tool_name: String,
        tool_args: Map<String, Value>,
        /// `i/n` within the round
        progress: String,
    },
    /// A tool finished
    ToolEnd {
        tool_id: String,
        tool_name: String,
        result: String,
    },
    /// A tool could not be resolved or failed
    ToolError {
        tool_id: String,
        error: String,
    },
    /// Terminal failure of the whole turn
    Error {
        content: String,
    },
}

impl AgentEvent {
    pub fn status(content: impl Into<String>) -> Self {
        AgentEvent::Status {
            content: content.into(),
        }
    }

    pub fn response_start() -> Self {
        AgentEvent::AiResponseStart {
            content: RESPONSE_START_TEXT.to_string(),
        }
    }

    pub fn response_chunk(content: impl Into<String>) -> Self {
        AgentEvent::AiResponseChunk {
            content: content.into(),
        }
    }

    pub fn response_end(content: impl Into<String>) -> Self {
        AgentEvent::AiResponseEnd {
            content: content.into(),
        }
    }

    pub fn tool_plan(tool_count: usize) -> Self {
        AgentEvent::ToolPlan {
            content: format!("AI decided to call {} tool(s)", tool_count),
            tool_count,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        AgentEvent::Error {
            content: content.into(),
        }
    }

    /// Whether this event ends the turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentEvent::AiResponseEnd { .. } | AgentEvent::Error { .. })
    }

    /// Wire name of the event (`type` tag)
    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::Status { .. } => "status",
            AgentEvent::AiResponseStart { .. } => "ai_response_start",
            AgentEvent::AiResponseChunk { .. } => "ai_response_chunk",
            AgentEvent::AiResponseEnd { .. } => "ai_response_end",
            AgentEvent::AiResponseRetracted { .. } => "ai_response_retracted",
            AgentEvent::ToolPlan { .. } => "tool_plan",
            AgentEvent::ToolStart { .. } => "tool_start",
            AgentEvent::ToolEnd { .. } => "tool_end",
            AgentEvent::ToolError { .. } => "tool_error",
            AgentEvent::Error { .. } => "error",
        }
    }
}
