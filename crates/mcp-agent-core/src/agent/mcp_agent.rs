//! The agent: startup, tool discovery and the chat entry point

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_stream::stream;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use thiserror::Error;

use super::arbiter::{run_turn, AgentOptions, TurnContext};
use super::session::SessionContexts;
use super::transcript::{HistoryTurn, Transcript};
use crate::config::{AgentSettings, ConfigError, ConfigStore};
use crate::logging::Logger;
use crate::mcp::{probe_server, McpClient};
use crate::providers::{create_provider, ModelClient, ModelClientPair, Provider};
use crate::tools::{InvocationContext, McpToolHandle, ToolExecutor, ToolHandle, ToolRegistry, ToolsInfo};
use crate::types::AgentEvent;

/// Session used when the caller does not name one
pub const DEFAULT_SESSION_ID: &str = "default";

/// Agent startup errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Agent is not initialized")]
    NotInitialized,
}

/// Conversational agent over remote MCP tools
///
/// # Example
///
/// ```rust,ignore
/// let mut agent = McpAgent::from_env(logger);
/// if agent.initialize().await {
///     let mut events = agent.chat_stream("What's the weather in Paris?", &[], Some("s1"));
///     while let Some(event) = events.next().await {
///         println!("{:?}", event);
///     }
/// }
/// ```
pub struct McpAgent {
    settings: AgentSettings,
    config_store: ConfigStore,
    options: AgentOptions,
    provider: Option<Arc<dyn Provider>>,
    registry: ToolRegistry,
    executor: ToolExecutor,
    models: Option<ModelClientPair>,
    clients: Vec<Arc<McpClient>>,
    sessions: SessionContexts,
    logger: Arc<dyn Logger>,
}

impl McpAgent {
    pub fn new(settings: AgentSettings, config_store: ConfigStore, logger: Arc<dyn Logger>) -> Self {
        Self {
            executor: ToolExecutor::new(settings.timeout, Arc::clone(&logger)),
            registry: ToolRegistry::new(Arc::clone(&logger)),
            settings,
            config_store,
            options: AgentOptions::default(),
            provider: None,
            models: None,
            clients: Vec::new(),
            sessions: SessionContexts::new(),
            logger,
        }
    }

    /// Settings from `.env`/environment, config from the user config dir
    pub fn from_env(logger: Arc<dyn Logger>) -> Self {
        let store = ConfigStore::user(Arc::clone(&logger));
        Self::new(AgentSettings::from_env(), store, logger)
    }

    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }

    /// Use this provider instead of the OpenAI-compatible default
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Register in-process tools under `group` alongside the remote ones
    pub fn with_tools(mut self, group: &str, handles: Vec<Arc<dyn ToolHandle>>) -> Self {
        self.registry.register(group, handles);
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.models.is_some()
    }

    /// Initialize, logging the reason on failure
    pub async fn initialize(&mut self) -> bool {
        match self.try_initialize().await {
            Ok(()) => true,
            Err(e) => {
                self.logger.error(&format!("[McpAgent] Initialization failed: {}", e));
                false
            }
        }
    }

    /// Read settings and config, connect every server, bind tools to the model
    ///
    /// A server that cannot be reached or listed is registered with no tools;
    /// only a missing API key fails initialization.
    pub async fn try_initialize(&mut self) -> Result<(), AgentError> {
        if self.is_initialized() {
            self.logger.debug("[McpAgent] Already initialized");
            return Ok(());
        }

        self.settings.require_api_key()?;
        self.logger.info(&format!(
            "[McpAgent] Using model '{}' at {}",
            self.settings.model,
            self.settings.base_url.as_deref().unwrap_or("the default endpoint")
        ));

        let config = self.config_store.load();
        self.logger.info(&format!(
            "[McpAgent] {} server(s) configured in {}",
            config.servers.len(),
            self.config_store.path().display()
        ));

        for (name, server) in &config.servers {
            if let Some(url) = server.url() {
                probe_server(name, url, &self.logger).await;
            }

            let client = match McpClient::connect(name, server, Arc::clone(&self.logger)).await {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    self.logger.error(&format!("[McpAgent] Cannot connect to '{}': {}", name, e));
                    self.registry.register(name, Vec::new());
                    continue;
                }
            };

            let handles: Vec<Arc<dyn ToolHandle>> = match client.list_tools().await {
                Ok(tools) => tools
                    .into_iter()
                    .map(|tool| Arc::new(McpToolHandle::new(Arc::clone(&client), tool)) as Arc<dyn ToolHandle>)
                    .collect(),
                Err(e) => {
                    self.logger.error(&format!("[McpAgent] Cannot list tools of '{}': {}", name, e));
                    Vec::new()
                }
            };

            self.registry.register(name, handles);
            self.clients.push(client);
        }

        let provider = self
            .provider
            .clone()
            .unwrap_or_else(|| create_provider("openai", Arc::clone(&self.logger)));
        let base = ModelClient::from_settings(provider, &self.settings);
        self.models = Some(ModelClientPair::new(base, self.registry.llm_tools()));

        self.logger.info(&format!(
            "[McpAgent] Ready with {} tool(s) from {} group(s)",
            self.registry.len(),
            self.registry.group_count()
        ));
        Ok(())
    }

    /// Stream the events of one user turn
    ///
    /// Never fails: problems surface as a terminal `error` event. Dropping the
    /// stream cancels the model request in flight.
    pub fn chat_stream(
        &self,
        input: &str,
        history: &[HistoryTurn],
        session_id: Option<&str>,
    ) -> BoxStream<'_, AgentEvent> {
        let session = self.sessions.begin_turn(session_id.unwrap_or(DEFAULT_SESSION_ID));
        self.logger.info(&format!(
            "[McpAgent] Turn {} of session '{}': {} chars, {} prior turn(s)",
            session.turns,
            session.id,
            input.len(),
            history.len()
        ));

        let events: BoxStream<'_, AgentEvent> = match &self.models {
            None => stream::once(async { AgentEvent::error(AgentError::NotInitialized.to_string()) }).boxed(),
            Some(models) => {
                let transcript = Transcript::from_history(history, self.options.history_limit, input);
                let ctx = TurnContext {
                    model: &models.tools,
                    registry: &self.registry,
                    executor: &self.executor,
                    options: self.options,
                    logger: Arc::clone(&self.logger),
                    invocation: InvocationContext::new(session.id),
                };
                run_turn(ctx, transcript).boxed()
            }
        };

        guarded(events, Arc::clone(&self.logger)).boxed()
    }

    /// Tools grouped by server
    pub fn tools_info(&self) -> ToolsInfo {
        self.registry.describe()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionContexts {
        &self.sessions
    }

    /// Drop a session's context
    pub fn forget_session(&self, session_id: &str) -> bool {
        self.sessions.forget(session_id).is_some()
    }

    /// Model clients, once initialized
    pub fn models(&self) -> Option<&ModelClientPair> {
        self.models.as_ref()
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Release the model clients and close every server session
    pub async fn close(&mut self) {
        self.models = None;
        // Tool handles hold the last other references to the clients
        self.registry = ToolRegistry::new(Arc::clone(&self.logger));

        for client in self.clients.drain(..) {
            match Arc::try_unwrap(client) {
                Ok(client) => {
                    let name = client.server_name().to_string();
                    if let Err(e) = client.close().await {
                        self.logger.warn(&format!("[McpAgent] Error closing '{}': {}", name, e));
                    }
                }
                Err(shared) => {
                    self.logger.debug(&format!(
                        "[McpAgent] '{}' is still referenced; it closes when dropped",
                        shared.server_name()
                    ));
                }
            }
        }
        self.logger.info("[McpAgent] Closed");
    }
}

impl std::fmt::Debug for McpAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpAgent")
            .field("model", &self.settings.model)
            .field("initialized", &self.is_initialized())
            .field("registry", &self.registry)
            .field("clients", &self.clients.len())
            .finish()
    }
}

/// Turn a panic anywhere in `events` into one terminal `error` event
fn guarded<'a>(events: BoxStream<'a, AgentEvent>, logger: Arc<dyn Logger>) -> impl Stream<Item = AgentEvent> + Send + 'a {
    stream! {
        let mut events = AssertUnwindSafe(events).catch_unwind();
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => yield event,
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    logger.error(&format!("[McpAgent] chat_stream panicked: {}", message));
                    yield AgentEvent::error(format!("Error while processing the request: {}", message));
                    break;
                }
            }
        }
    }
}
