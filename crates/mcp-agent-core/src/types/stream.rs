//! Streaming response types

use serde::{Deserialize, Serialize};
use super::tool::ToolCall;

/// Streaming chunk from an LLM response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// Text content chunk
    Text {
        text: String,
    },
    /// Complete tool call
    ToolCall {
        #[serde(rename = "toolCall")]
        tool_call: ToolCall,
    },
    /// Partial tool call (for streaming tool arguments)
    ToolCallDelta {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(rename = "inputDelta", skip_serializing_if = "Option::is_none")]
        input_delta: Option<String>,
    },
    /// Terminal event: everything the completion resolved to
    End {
        /// Tool calls captured over the whole completion
        #[serde(rename = "toolCalls", default)]
        tool_calls: Vec<ToolCall>,
        /// Captured text content, if the backend reports it
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

impl StreamChunk {
    /// Create a text chunk
    pub fn text(text: impl Into<String>) -> Self {
        StreamChunk::Text { text: text.into() }
    }

    /// Create a tool call chunk
    pub fn tool_call(tool_call: ToolCall) -> Self {
        StreamChunk::ToolCall { tool_call }
    }

    /// Create a terminal chunk
    pub fn end(tool_calls: Vec<ToolCall>, content: Option<String>) -> Self {
        StreamChunk::End { tool_calls, content }
    }

    /// Check if this is a text chunk
    pub fn is_text(&self) -> bool {
        matches!(self, StreamChunk::Text { .. })
    }

    /// Check if this is the terminal chunk
    pub fn is_end(&self) -> bool {
        matches!(self, StreamChunk::End { .. })
    }

    /// Get the text content if this is a text chunk
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamChunk::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_chunk() {
        let chunk = StreamChunk::text("Hello");
        assert!(chunk.is_text());
        assert!(!chunk.is_end());
        assert_eq!(chunk.as_text(), Some("Hello"));
    }

    #[test]
    fn test_end_chunk() {
        let call = ToolCall::new("id1", "get_weather", json!({"location": "NYC"}));
        let chunk = StreamChunk::end(vec![call], None);
        assert!(chunk.is_end());
        assert_eq!(chunk.as_text(), None);
    }

    #[test]
    fn test_chunk_serialization() {
        let chunk = StreamChunk::text("Hello world");
        let json = serde_json::to_string(&chunk).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"text\":\"Hello world\""));

        let end = StreamChunk::end(Vec::new(), Some("done".to_string()));
        let json = serde_json::to_string(&end).unwrap();
        assert!(json.contains("\"type\":\"end\""));
    }
}
