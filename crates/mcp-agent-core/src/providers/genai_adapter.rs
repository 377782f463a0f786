//! Adapter between mcp-agent-core types and genai types
//!
//! Conversion functions in both directions, plus construction of a genai
//! `Client` that talks the OpenAI protocol to a configurable endpoint with an
//! explicit API key (no environment lookups inside genai).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatRole as GenaiRole,
    ChatStreamEvent, MessageContent as GenaiContent, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::{json, Value};

use crate::types::{ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool, ToolCall};

use super::error::{ProviderError, ProviderResult};
use super::traits::StreamChatOptions;

/// Endpoint used when no base URL is configured
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1/";

// ============================================================================
// Message Conversion: mcp-agent -> genai
// ============================================================================

/// Convert MessageRole to genai ChatRole
pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
        MessageRole::Tool => GenaiRole::Tool,
    }
}

/// Build a genai tool call from its parts
///
/// Goes through serde so that fields genai adds over time keep their defaults.
fn to_genai_tool_call(id: &str, name: &str, input: &Value) -> ProviderResult<GenaiToolCall> {
    let call = serde_json::from_value(json!({
        "call_id": id,
        "fn_name": name,
        "fn_arguments": input,
    }))?;
    Ok(call)
}

fn text_message(role: MessageRole, text: String) -> ProviderResult<GenaiMessage> {
    let content = GenaiContent::from(text);
    match role {
        MessageRole::System => Ok(GenaiMessage::system(content)),
        MessageRole::User => Ok(GenaiMessage::user(content)),
        MessageRole::Assistant => Ok(GenaiMessage::assistant(content)),
        MessageRole::Tool => Err(ProviderError::InvalidRequest(
            "tool message without a tool result part".to_string(),
        )),
    }
}

/// Convert one transcript message; tool-result messages may expand to several
pub fn to_genai_message(msg: ChatMessage) -> ProviderResult<Vec<GenaiMessage>> {
    let parts = match msg.content {
        MessageContent::Text(text) => return Ok(vec![text_message(msg.role, text)?]),
        MessageContent::Parts(parts) => parts,
    };

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    let mut tool_responses = Vec::new();

    for part in parts {
        match part {
            ContentPart::Text { text } => texts.push(text),
            ContentPart::ToolUse { id, name, input } => {
                tool_calls.push(to_genai_tool_call(&id, &name, &input)?);
            }
            ContentPart::ToolResult { tool_use_id, content, .. } => {
                tool_responses.push(GenaiToolResponse::new(tool_use_id, content));
            }
        }
    }

    if !tool_calls.is_empty() {
        return Ok(vec![GenaiMessage::from(tool_calls)]);
    }
    if !tool_responses.is_empty() {
        return Ok(tool_responses.into_iter().map(GenaiMessage::from).collect());
    }
    Ok(vec![text_message(msg.role, texts.join("\n"))?])
}

/// Convert a vector of messages to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> ProviderResult<Vec<GenaiMessage>> {
    let mut out = Vec::with_capacity(messages.len());
    for msg in messages {
        out.extend(to_genai_message(msg)?);
    }
    Ok(out)
}

// ============================================================================
// Tool Conversion: mcp-agent -> genai
// ============================================================================

/// Convert Tool to genai Tool
pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = tool.input_schema {
        genai_tool = genai_tool.with_schema(schema);
    }

    genai_tool
}

/// Convert tools to genai tools
pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: mcp-agent -> genai
// ============================================================================

/// Convert StreamChatOptions to genai ChatOptions
pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // The terminal event must report both the text and the tool calls
    genai_opts
        .with_capture_content(true)
        .with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> mcp-agent
// ============================================================================

/// Convert genai ToolCall to ToolCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall {
        id: tc.call_id.clone(),
        name: tc.fn_name.clone(),
        input: tc.fn_arguments.clone(),
    }
}

/// Convert genai stream event to StreamChunk
pub fn from_genai_event(event: ChatStreamEvent) -> Option<Result<StreamChunk, ProviderError>> {
    match event {
        ChatStreamEvent::Chunk(chunk) => Some(Ok(StreamChunk::Text {
            text: chunk.content,
        })),
        ChatStreamEvent::ToolCallChunk(chunk) => Some(Ok(StreamChunk::ToolCallDelta {
            id: chunk.tool_call.call_id,
            name: Some(chunk.tool_call.fn_name),
            input_delta: Some(chunk.tool_call.fn_arguments.to_string()),
        })),
        ChatStreamEvent::End(end) => {
            let tool_calls = end
                .captured_tool_calls()
                .map(|calls| calls.iter().map(|tc| from_genai_tool_call(tc)).collect())
                .unwrap_or_default();
            let content = end.captured_first_text().map(|t| t.to_string());
            Some(Ok(StreamChunk::End { tool_calls, content }))
        }
        ChatStreamEvent::Start => None,
        ChatStreamEvent::ReasoningChunk(_) => None,
        ChatStreamEvent::ThoughtSignatureChunk(_) => None,
    }
}

// ============================================================================
// Client Creation
// ============================================================================

/// What a genai client needs to reach an OpenAI-compatible endpoint
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
    /// Connect/read timeout
    pub timeout: Option<Duration>,
}

/// genai joins request paths onto the endpoint, so it must end with '/'
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

/// Create a genai Client that uses the OpenAI protocol for every model name
///
/// Model names such as `deepseek-chat` would otherwise be routed to a native
/// adapter; the configured endpoint decides who actually serves them.
pub fn create_client(config: &ClientConfig) -> ProviderResult<Client> {
    let api_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = api_key.clone();
            Box::pin(async move { Ok(key.map(AuthData::from_single)) })
        }
    );

    let endpoint_url = normalize_base_url(config.api_base.as_deref().unwrap_or(DEFAULT_OPENAI_BASE));

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { ref model, .. } = target;
            let resolved_model = ModelIden::new(AdapterKind::OpenAI, model.model_name.clone());

            Ok(ServiceTarget {
                endpoint: Endpoint::from_owned(endpoint_url.clone()),
                auth: target.auth, // Auth is handled by AuthResolver
                model: resolved_model,
            })
        },
    );

    let mut http = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        http = http.connect_timeout(timeout).read_timeout(timeout);
    }
    let http = http.build()?;

    Ok(Client::builder()
        .with_reqwest(http)
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build())
}
