//! Invocation handles for registered tools

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use super::schema::{JsonSchemaObject, ToolSchemaSource, TypedSchema};
use crate::mcp::{result_text, McpClient, McpTool};

/// Tool invocation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    NotFound(String),

    #[error("Tool execution failed: {0}")]
    Execution(String),

    #[error("Tool '{name}' timed out after {secs}s")]
    Timeout { name: String, secs: u64 },

    #[error("Tool '{0}' panicked")]
    Panicked(String),
}

/// Who is invoking a tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    pub session_id: String,
}

impl InvocationContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// Something the agent can call on the model's behalf
#[async_trait]
pub trait ToolHandle: ToolSchemaSource + Send + Sync {
    /// Name as the provider knows it
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run the tool with already-normalized arguments
    async fn invoke(&self, args: Map<String, Value>, ctx: &InvocationContext) -> Result<String, ToolError>;
}

// ============================================================================
// Remote tools
// ============================================================================

/// A tool served by a remote MCP server
pub struct McpToolHandle {
    client: Arc<McpClient>,
    tool: McpTool,
}

impl McpToolHandle {
    pub fn new(client: Arc<McpClient>, tool: McpTool) -> Self {
        Self { client, tool }
    }
}

impl ToolSchemaSource for McpToolHandle {
    fn input_schema(&self) -> Option<Value> {
        Some(Value::Object(self.tool.input_schema.as_ref().clone()))
    }
}

#[async_trait]
impl ToolHandle for McpToolHandle {
    fn name(&self) -> &str {
        &self.tool.name
    }

    fn description(&self) -> &str {
        self.tool.description.as_deref().unwrap_or_default()
    }

    async fn invoke(&self, args: Map<String, Value>, _ctx: &InvocationContext) -> Result<String, ToolError> {
        let result = self
            .client
            .call_tool(&self.tool.name, args)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        result_text(&result).map_err(ToolError::Execution)
    }
}

// ============================================================================
// In-process tools
// ============================================================================

type Handler = Arc<dyn Fn(Map<String, Value>, InvocationContext) -> BoxFuture<'static, Result<String, String>> + Send + Sync>;

enum FunctionSchema {
    None,
    Inline(Map<String, Value>),
    Object(Box<dyn JsonSchemaObject>),
}

/// A tool backed by a Rust closure
///
/// # Example
///
/// ```rust
/// use mcp_agent_core::tools::FunctionTool;
/// use serde_json::json;
///
/// let clock = FunctionTool::new("now", "Current time", |_args, _ctx| async move {
///     Ok("12:00".to_string())
/// })
/// .with_inline_schema(json!({"type": "object", "properties": {}}));
/// ```
pub struct FunctionTool {
    name: String,
    description: String,
    schema: FunctionSchema,
    handler: Handler,
}

impl FunctionTool {
    /// Tool taking the raw argument map
    pub fn new<H, Fut>(name: impl Into<String>, description: impl Into<String>, handler: H) -> Self
    where
        H: Fn(Map<String, Value>, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, String>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema: FunctionSchema::None,
            handler: Arc::new(move |args, ctx| -> BoxFuture<'static, Result<String, String>> {
                Box::pin(handler(args, ctx))
            }),
        }
    }

    /// Tool taking typed arguments; the schema is derived from `A`
    pub fn typed<A, H, Fut>(name: impl Into<String>, description: impl Into<String>, handler: H) -> Self
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        H: Fn(A, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, String>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let mut tool = Self::new(name, description, move |args, ctx| {
            let handler = Arc::clone(&handler);
            async move {
                let parsed: A = serde_json::from_value(Value::Object(args))
                    .map_err(|e| format!("invalid arguments: {}", e))?;
                handler(parsed, ctx).await
            }
        });
        tool.schema = FunctionSchema::Object(Box::new(TypedSchema::<A>::new()));
        tool
    }

    /// Attach a JSON schema; non-object values are ignored
    pub fn with_inline_schema(mut self, schema: Value) -> Self {
        if let Value::Object(map) = schema {
            self.schema = FunctionSchema::Inline(map);
        }
        self
    }

    /// Attach a schema object
    pub fn with_schema_object(mut self, object: impl JsonSchemaObject + 'static) -> Self {
        self.schema = FunctionSchema::Object(Box::new(object));
        self
    }
}

impl ToolSchemaSource for FunctionTool {
    fn inline_schema(&self) -> Option<Map<String, Value>> {
        match &self.schema {
            FunctionSchema::Inline(map) => Some(map.clone()),
            _ => None,
        }
    }

    fn schema_object(&self) -> Option<&dyn JsonSchemaObject> {
        match &self.schema {
            FunctionSchema::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }
}

#[async_trait]
impl ToolHandle for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, args: Map<String, Value>, ctx: &InvocationContext) -> Result<String, ToolError> {
        (self.handler)(args, ctx.clone())
            .await
            .map_err(ToolError::Execution)
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::resolve_schema;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    struct AddArgs {
        a: i64,
        b: i64,
    }

    #[tokio::test]
    async fn test_function_tool_receives_session() {
        let tool = FunctionTool::new("whoami", "Session id", |_args, ctx| async move {
            Ok(ctx.session_id)
        });
        let out = tool
            .invoke(Map::new(), &InvocationContext::new("s-42"))
            .await
            .unwrap();
        assert_eq!(out, "s-42");
    }

    #[tokio::test]
    async fn test_typed_tool() {
        let tool = FunctionTool::typed("add", "Add numbers", |args: AddArgs, _ctx| async move {
            Ok((args.a + args.b).to_string())
        });

        let params = resolve_schema(&tool).unwrap();
        assert_eq!(params.required.len(), 2);

        let args = json!({"a": 2, "b": 3}).as_object().cloned().unwrap();
        assert_eq!(tool.invoke(args, &InvocationContext::default()).await.unwrap(), "5");

        let bad = json!({"a": "x"}).as_object().cloned().unwrap();
        let err = tool.invoke(bad, &InvocationContext::default()).await.unwrap_err();
        assert!(matches!(err, ToolError::Execution(msg) if msg.starts_with("invalid arguments")));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ToolError::NotFound("x".into()).to_string(), "Tool 'x' not found");
        assert_eq!(
            ToolError::Execution("boom".into()).to_string(),
            "Tool execution failed: boom"
        );
    }
}
