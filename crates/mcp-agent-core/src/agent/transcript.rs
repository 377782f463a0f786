//! Conversation transcript for one request

use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, MessageRole, ToolCall};

/// Prior turns kept when building a transcript
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// One earlier exchange supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub user_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
}

impl HistoryTurn {
    pub fn new(user_input: impl Into<String>, ai_response: Option<String>) -> Self {
        Self {
            user_input: user_input.into(),
            ai_response,
        }
    }
}

/// Append-only message list
///
/// System instructions are not stored; they are prepended by `request`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent `limit` turns of `history` followed by `input`
    pub fn from_history(history: &[HistoryTurn], limit: usize, input: &str) -> Self {
        let skip = history.len().saturating_sub(limit);
        let mut transcript = Self::new();
        for turn in &history[skip..] {
            transcript.push(ChatMessage::user(&turn.user_input));
            if let Some(reply) = turn.ai_response.as_deref().filter(|r| !r.is_empty()) {
                transcript.push(ChatMessage::assistant(reply));
            }
        }
        transcript.push(ChatMessage::user(input));
        transcript
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Record the model's decision to call tools
    pub fn push_tool_calls(&mut self, calls: &[ToolCall]) {
        self.push(ChatMessage::assistant_tool_calls(calls));
    }

    /// Record the answer to one tool call
    pub fn push_tool_result(&mut self, call: &ToolCall, content: impl Into<String>) {
        self.push(ChatMessage::tool_result(&call.id, &call.name, content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages for a model request: `system` first, then the transcript
    pub fn request(&self, system: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(self.messages.iter().cloned());
        messages
    }

    /// Whether every tool call in the last assistant tool-call entry is
    /// answered, in order, by the entries that follow it
    pub fn tool_calls_answered(&self) -> bool {
        tool_calls_answered(&self.messages)
    }
}

/// `Transcript::tool_calls_answered` over a plain message list, such as a
/// request already sent to the model
pub fn tool_calls_answered(messages: &[ChatMessage]) -> bool {
    let Some(pos) = messages
        .iter()
        .rposition(|m| m.role == MessageRole::Assistant && !m.tool_uses().is_empty())
    else {
        return true;
    };

    let ids: Vec<&str> = messages[pos].tool_uses().iter().map(|(id, _, _)| *id).collect();
    let answers: Vec<Option<&str>> = messages[pos + 1..]
        .iter()
        .map(|m| m.tool_result_id())
        .collect();

    answers.len() == ids.len()
        && ids.iter().zip(&answers).all(|(id, answer)| Some(*id) == *answer)
}
