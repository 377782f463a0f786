//! Chat-completion providers
//!
//! ## Architecture
//!
//! Real traffic goes through `GenaiProvider`, which uses the `genai` crate for
//! SSE parsing and tool-call capture and forces the OpenAI protocol onto
//! whatever endpoint `OPENAI_BASE_URL` names. Auth comes from the explicit
//! settings, never from genai's own environment lookups.
//!
//! `MockProvider` plays back scripted completions for tests and the CLI's
//! offline mode.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;
mod client;

pub use traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};

pub use genai_provider::GenaiProvider;
pub use genai_adapter::{ClientConfig, DEFAULT_OPENAI_BASE};

pub use mock::{MockConfig, MockMode, MockProvider, MockTurn, RecordedRequest};

pub use client::{ModelClient, ModelClientPair};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` yields an echoing `MockProvider`; anything else is treated as an
/// OpenAI-compatible endpoint.
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        _ => Arc::new(GenaiProvider::new(provider_id, logger)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_create_provider() {
        assert_eq!(create_provider("mock", Arc::new(NoOpLogger)).name(), "mock");
        assert_eq!(create_provider("MOCK", Arc::new(NoOpLogger)).name(), "mock");
        assert_eq!(create_provider("openai", Arc::new(NoOpLogger)).name(), "openai");
    }
}
