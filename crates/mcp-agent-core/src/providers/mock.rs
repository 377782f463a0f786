//! Mock provider for testing
//!
//! Deterministic, network-free responses. Besides the simple text modes it can
//! play back a script of completions (text chunks, tool calls, failures), one
//! per request, and records every request it receives.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::types::{
    CancellationToken, ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool,
    ToolCall,
};

/// One scripted completion
#[derive(Debug, Clone, Default)]
pub struct MockTurn {
    /// Text fragments streamed before the end
    pub chunks: Vec<String>,
    /// Tool calls reported by the terminal chunk
    pub tool_calls: Vec<ToolCall>,
    /// Captured text reported by the terminal chunk
    pub content: Option<String>,
    /// Fail when the stream is opened
    pub fail_open: Option<String>,
    /// Fail after this many chunks instead of ending
    pub fail_after: Option<(usize, String)>,
}

impl MockTurn {
    /// A completion that streams text and ends without tool calls
    pub fn text<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// A completion that only calls tools
    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    /// Add tool calls to the terminal chunk
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// Set the captured text of the terminal chunk
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Fail when opened
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_open: Some(message.into()),
            ..Default::default()
        }
    }

    /// Fail after `after` chunks
    pub fn with_failure_after(mut self, after: usize, message: impl Into<String>) -> Self {
        self.fail_after = Some((after, message.into()));
        self
    }
}

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Play the turns in order, repeating the last one once exhausted
    Script(Vec<MockTurn>),
}

/// A request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Option<Vec<Tool>>,
}

/// Configuration for the mock provider
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Response mode
    pub mode: MockMode,
    /// Delay between chunks in milliseconds (0 = no delay)
    pub chunk_delay_ms: u64,
    /// Size of each chunk when splitting fixed/echo responses
    pub chunk_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mode: MockMode::Echo,
            chunk_delay_ms: 0,
            chunk_size: 10,
        }
    }
}

/// Mock LLM provider for testing
pub struct MockProvider {
    config: MockConfig,
    logger: Arc<dyn Logger>,
    turn: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProvider {
    /// Create with specific config
    pub fn with_config(config: MockConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            logger,
            turn: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_config(MockConfig::default(), logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Create a scripted provider
    pub fn scripted(turns: Vec<MockTurn>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Script(turns), logger)
    }

    fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode,
                ..Default::default()
            },
            logger,
        )
    }

    /// Set chunk delay
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.chunk_delay_ms = delay_ms;
        self
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of `stream_chat` calls so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn last_user_message(messages: &[ChatMessage]) -> String {
        for msg in messages.iter().rev() {
            if msg.role != MessageRole::User {
                continue;
            }
            let text = match &msg.content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Parts(parts) => parts
                    .iter()
                    .filter_map(|p| match p {
                        ContentPart::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect(),
            };
            if !text.is_empty() {
                return text;
            }
        }
        "Hello from MockProvider!".to_string()
    }

    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if self.config.chunk_size == 0 || text.is_empty() {
            return vec![text.to_string()];
        }

        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.config.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }

    /// The turn to play for the next request
    fn next_turn(&self, messages: &[ChatMessage]) -> MockTurn {
        match &self.config.mode {
            MockMode::Echo => {
                let user_msg = Self::last_user_message(messages);
                MockTurn::text(self.split_into_chunks(&format!("Echo: {}", user_msg)))
            }
            MockMode::Fixed(response) => MockTurn::text(self.split_into_chunks(response)),
            MockMode::Script(turns) => {
                let index = self.turn.fetch_add(1, Ordering::SeqCst);
                turns
                    .get(index)
                    .or_else(|| turns.last())
                    .cloned()
                    .unwrap_or_default()
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_api_base(&self) -> &str {
        "http://localhost:0/mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let turn = self.next_turn(&messages);
        self.requests.lock().push(RecordedRequest {
            messages,
            tools: options.tools,
        });

        if let Some(message) = turn.fail_open {
            self.logger.debug(&format!("MockProvider: failing open: {}", message));
            return Err(ProviderError::Other(format!("Mock error: {}", message)));
        }

        self.logger.debug(&format!(
            "MockProvider: {} chunk(s), {} tool call(s)",
            turn.chunks.len(),
            turn.tool_calls.len()
        ));

        let mut items: Vec<ProviderResult<StreamChunk>> = Vec::new();
        let fail_at = turn.fail_after.as_ref().map(|(n, _)| *n);
        for (i, text) in turn.chunks.into_iter().enumerate() {
            if fail_at == Some(i) {
                break;
            }
            items.push(Ok(StreamChunk::text(text)));
        }
        match turn.fail_after {
            Some((_, message)) => {
                items.push(Err(ProviderError::Other(format!("Mock error: {}", message))));
            }
            None => items.push(Ok(StreamChunk::end(turn.tool_calls, turn.content))),
        }

        let delay_ms = self.config.chunk_delay_ms;
        let stream = stream::iter(items.into_iter().enumerate()).then(move |(i, item)| {
            let cancel = cancel_token.clone();
            async move {
                if cancel.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }
                if i > 0 && delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                item
            }
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    async fn collect(provider: &MockProvider, content: &str) -> Vec<ProviderResult<StreamChunk>> {
        let stream = provider
            .stream_chat(
                vec![ChatMessage::user(content)],
                ProviderModelConfig::new("mock"),
                StreamChatOptions::default(),
                CancellationToken::new(),
            )
            .await
            .expect("stream should start");
        stream.collect().await
    }

    fn text_of(items: &[ProviderResult<StreamChunk>]) -> String {
        items
            .iter()
            .filter_map(|c| c.as_ref().ok().and_then(|c| c.as_text()))
            .collect()
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let provider = MockProvider::echo(test_logger());
        let items = collect(&provider, "Hello, world!").await;

        assert!(text_of(&items).contains("Hello, world!"));
        assert!(matches!(items.last(), Some(Ok(chunk)) if chunk.is_end()));
    }

    #[tokio::test]
    async fn test_fixed_mode() {
        let provider = MockProvider::fixed("This is a test response.", test_logger());
        let items = collect(&provider, "Anything").await;
        assert_eq!(text_of(&items), "This is a test response.");
    }

    #[tokio::test]
    async fn test_script_plays_turns_in_order_then_repeats_last() {
        let provider = MockProvider::scripted(
            vec![
                MockTurn::tools(vec![ToolCall::new("c1", "lookup", json!({"q": 1}))]),
                MockTurn::text(["done"]),
            ],
            test_logger(),
        );

        let first = collect(&provider, "a").await;
        match first.last() {
            Some(Ok(StreamChunk::End { tool_calls, .. })) => assert_eq!(tool_calls.len(), 1),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(text_of(&collect(&provider, "b").await), "done");
        assert_eq!(text_of(&collect(&provider, "c").await), "done");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_script_failures() {
        let provider = MockProvider::scripted(
            vec![
                MockTurn::failing("refused"),
                MockTurn::text(["a", "b", "c"]).with_failure_after(2, "dropped"),
            ],
            test_logger(),
        );

        let opened = provider
            .stream_chat(
                vec![ChatMessage::user("x")],
                ProviderModelConfig::new("mock"),
                StreamChatOptions::default(),
                CancellationToken::new(),
            )
            .await;
        assert!(opened.is_err());

        let items = collect(&provider, "y").await;
        assert_eq!(text_of(&items), "ab");
        assert!(items.last().map(|r| r.is_err()).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_records_requests() {
        let provider = MockProvider::fixed("ok", test_logger());
        let tools = vec![Tool::new("lookup", "Find things")];
        let _ = provider
            .stream_chat(
                vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
                ProviderModelConfig::new("mock"),
                StreamChatOptions::new().with_tools(tools.clone()),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[0].tools, Some(tools));
    }

    #[tokio::test]
    async fn test_cancellation() {
        let provider =
            MockProvider::fixed("Long response that should be cancelled", test_logger()).with_delay(10);
        let cancel = CancellationToken::new();

        let mut stream = provider
            .stream_chat(
                vec![ChatMessage::user("x")],
                ProviderModelConfig::new("mock"),
                StreamChatOptions::default(),
                cancel.clone(),
            )
            .await
            .expect("stream should start");

        assert!(stream.next().await.is_some());
        cancel.cancel();
        assert!(matches!(stream.next().await, Some(Err(ProviderError::Cancelled))));
    }

    #[tokio::test]
    async fn test_fixed_response_is_split_by_chunk_size() {
        let config = MockConfig {
            mode: MockMode::Fixed("Hello, world!".into()),
            chunk_size: 5,
            ..Default::default()
        };
        let provider = MockProvider::with_config(config, test_logger());
        let items = collect(&provider, "x").await;

        let chunks: Vec<&str> = items
            .iter()
            .filter_map(|c| c.as_ref().ok().and_then(|c| c.as_text()))
            .collect();
        assert_eq!(chunks, vec!["Hello", ", wor", "ld!"]);
    }
}
