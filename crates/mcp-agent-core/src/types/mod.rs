//! Core types for agent interactions
//!
//! This module contains the shared types used by providers, tools and the agent loop.

mod message;
mod tool;
mod stream;
mod event;
mod cancellation;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use tool::{Tool, ToolCall};
pub use stream::StreamChunk;
pub use event::{AgentEvent, RESPONSE_START_TEXT};
pub use cancellation::{CancellationToken, CancelOnDrop};
