//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition for function calling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Tool call intent produced by the model
///
/// `input` is whatever the model produced: usually a JSON object, but some
/// backends hand back the raw JSON-encoded argument string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier for this tool call (may be empty if the model omitted it)
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Raw input arguments for the tool
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Fill in a positional id (`call_<n>`, 1-based) when the model sent none
    pub fn with_fallback_id(mut self, position: usize) -> Self {
        if self.id.trim().is_empty() {
            self.id = format!("call_{}", position);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_creation() {
        let tool = Tool::new("get_weather", "Get the current weather")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string" }
                },
                "required": ["location"]
            }));

        assert_eq!(tool.name, "get_weather");
        assert!(tool.input_schema.is_some());
    }

    #[test]
    fn test_fallback_id() {
        let missing = ToolCall::new("", "lookup", json!({})).with_fallback_id(2);
        assert_eq!(missing.id, "call_2");

        let present = ToolCall::new("abc", "lookup", json!({})).with_fallback_id(2);
        assert_eq!(present.id, "abc");
    }
}
