//! GenaiProvider - OpenAI-compatible chat completions through the genai crate

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

use genai::chat::{ChatRequest, ChatStreamEvent};

use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_event, to_genai_messages, to_genai_options, to_genai_tools,
    ClientConfig, DEFAULT_OPENAI_BASE,
};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

/// First retry delay; doubles on every further attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Provider for any endpoint that speaks the OpenAI chat-completions protocol
pub struct GenaiProvider {
    provider_id: String,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a new GenaiProvider
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider_id: provider_id.into(),
            logger,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    fn backoff(attempt: u32) -> Duration {
        RETRY_BASE_DELAY * 2u32.saturating_pow(attempt.saturating_sub(1).min(6))
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    fn default_api_base(&self) -> &str {
        DEFAULT_OPENAI_BASE
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        self.logger.info(&format!(
            "[GenaiProvider] stream_chat called: provider={}, model={}, tools={}",
            self.provider_id,
            model_config.model,
            options.tools.as_ref().map(|t| t.len()).unwrap_or(0)
        ));

        if model_config.api_key.is_none() {
            return Err(ProviderError::missing_api_key(&self.provider_id));
        }

        let client = create_client(&ClientConfig {
            api_key: model_config.api_key.clone(),
            api_base: Some(self.get_api_base(&model_config)),
            timeout: model_config.timeout,
        })?;

        let mut chat_req = ChatRequest::new(to_genai_messages(messages)?);

        if let Some(tools) = &options.tools {
            if !tools.is_empty() {
                chat_req = chat_req.with_tools(to_genai_tools(tools.clone()));
            }
        }

        let genai_options = to_genai_options(&options);

        // Only opening the stream is retried; a stream that fails midway is
        // reported to the caller as-is.
        let mut attempt = 0u32;
        let chat_stream = loop {
            if cancel_token.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }

            match client
                .exec_chat_stream(&model_config.model, chat_req.clone(), Some(&genai_options))
                .await
            {
                Ok(stream) => break stream,
                Err(e) if attempt < options.max_retries => {
                    attempt += 1;
                    let delay = Self::backoff(attempt);
                    self.logger.warn(&format!(
                        "[GenaiProvider] Failed to open stream (attempt {}/{}), retrying in {:?}: {}",
                        attempt,
                        options.max_retries + 1,
                        delay,
                        e
                    ));
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel_token.cancelled() => return Err(ProviderError::Cancelled),
                    }
                }
                Err(e) => {
                    self.logger.error(&format!("[GenaiProvider] Failed to open stream: {}", e));
                    return Err(ProviderError::api_error(&self.provider_id, 500, e.to_string()));
                }
            }
        };

        self.logger.debug("[GenaiProvider] Stream started");

        let cancel = cancel_token.clone();
        let logger = Arc::clone(&self.logger);
        let provider_id = self.provider_id.clone();

        let stream = chat_stream.stream.filter_map(move |result| {
            let cancel = cancel.clone();
            let logger = Arc::clone(&logger);
            let provider_id = provider_id.clone();

            async move {
                if cancel.is_cancelled() {
                    logger.info("[GenaiProvider] Stream cancelled");
                    return Some(Err(ProviderError::Cancelled));
                }

                match result {
                    Ok(event) => {
                        match &event {
                            ChatStreamEvent::Chunk(c) => {
                                logger.debug(&format!(
                                    "[GenaiProvider] Chunk ({} chars)",
                                    c.content.len()
                                ));
                            }
                            ChatStreamEvent::End(_) => {
                                logger.debug("[GenaiProvider] End");
                            }
                            _ => {}
                        }
                        from_genai_event(event)
                    }
                    Err(e) => {
                        logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                        Some(Err(ProviderError::api_error(provider_id, 500, e.to_string())))
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
