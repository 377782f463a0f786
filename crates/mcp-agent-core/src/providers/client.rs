//! Bound model clients used by the agent loop

use std::sync::Arc;

use super::error::ProviderResult;
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::config::AgentSettings;
use crate::types::{CancellationToken, ChatMessage, Tool};

/// A provider together with the model and request options to use with it
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    options: StreamChatOptions,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn Provider>, model: ProviderModelConfig, options: StreamChatOptions) -> Self {
        Self {
            provider,
            model,
            options,
        }
    }

    /// Client configured from the environment settings
    pub fn from_settings(provider: Arc<dyn Provider>, settings: &AgentSettings) -> Self {
        let mut model = ProviderModelConfig::new(&settings.model).with_timeout(settings.timeout);
        if let Some(key) = &settings.api_key {
            model = model.with_api_key(key);
        }
        if let Some(base) = &settings.base_url {
            model = model.with_api_base(base);
        }

        let options = StreamChatOptions::new()
            .with_temperature(settings.temperature)
            .with_max_retries(settings.max_retries);

        Self::new(provider, model, options)
    }

    /// The same client with a tool list attached to every request
    pub fn bind_tools(&self, tools: Vec<Tool>) -> Self {
        let mut bound = self.clone();
        bound.options.tools = Some(tools);
        bound
    }

    /// Whether requests carry tools
    pub fn has_tools(&self) -> bool {
        self.options.tools.as_ref().map(|t| !t.is_empty()).unwrap_or(false)
    }

    pub fn model(&self) -> &ProviderModelConfig {
        &self.model
    }

    /// Open a streaming completion over `messages`
    pub async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        self.provider
            .stream_chat(messages, self.model.clone(), self.options.clone(), cancel_token)
            .await
    }
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider.name())
            .field("model", &self.model.model)
            .field("tools", &self.options.tools.as_ref().map(|t| t.len()))
            .finish()
    }
}

/// The plain client and its tool-bound twin
#[derive(Debug, Clone)]
pub struct ModelClientPair {
    pub plain: ModelClient,
    pub tools: ModelClient,
}

impl ModelClientPair {
    pub fn new(base: ModelClient, tools: Vec<Tool>) -> Self {
        Self {
            tools: base.bind_tools(tools),
            plain: base,
        }
    }
}
