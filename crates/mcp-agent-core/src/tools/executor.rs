//! Tool execution
//!
//! Turns a model's tool-call intent into a result string. Whatever goes wrong
//! (unknown name, remote failure, timeout, panic) comes back as a
//! `ToolOutcome::Failure`, never as an error or unwind.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::{Map, Value};

use super::handle::{InvocationContext, ToolError};
use super::registry::{ToolDescriptor, ToolRegistry};
use crate::logging::Logger;

/// Key used for arguments that are not a JSON object
pub const RAW_ARGS_KEY: &str = "$raw";

/// Result of one tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// Content of the tool entry appended to the transcript
    pub fn transcript_content(&self) -> String {
        match self {
            ToolOutcome::Success(text) => text.clone(),
            ToolOutcome::Failure(message) => format!("Error: {}", message),
        }
    }
}

/// Coerce model-produced arguments into an argument map
///
/// Objects pass through. Null and empty strings become `{}`. Strings holding
/// a JSON object are decoded; anything else is kept under `$raw`.
pub fn normalize_arguments(raw: Value) -> Map<String, Value> {
    let raw_entry = |s: String| {
        let mut map = Map::new();
        map.insert(RAW_ARGS_KEY.to_string(), Value::String(s));
        map
    };

    match raw {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        Value::String(s) if s.trim().is_empty() => Map::new(),
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => map,
            _ => raw_entry(s),
        },
        other => raw_entry(other.to_string()),
    }
}

/// Invokes registered tools with a per-call timeout
pub struct ToolExecutor {
    timeout: Duration,
    logger: Arc<dyn Logger>,
}

impl ToolExecutor {
    pub fn new(timeout: Duration, logger: Arc<dyn Logger>) -> Self {
        Self { timeout, logger }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke a resolved tool
    pub async fn invoke(
        &self,
        descriptor: &ToolDescriptor,
        args: Map<String, Value>,
        ctx: &InvocationContext,
    ) -> ToolOutcome {
        self.logger.info(&format!(
            "[ToolExecutor] Invoking '{}' (session {})",
            descriptor.name, ctx.session_id
        ));

        let call = AssertUnwindSafe(descriptor.handle.invoke(args, ctx)).catch_unwind();

        let error = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(text))) => {
                self.logger.debug(&format!(
                    "[ToolExecutor] '{}' returned {} chars",
                    descriptor.name,
                    text.len()
                ));
                return ToolOutcome::Success(text);
            }
            Ok(Ok(Err(e))) => e,
            Ok(Err(_panic)) => ToolError::Panicked(descriptor.name.clone()),
            Err(_elapsed) => ToolError::Timeout {
                name: descriptor.name.clone(),
                secs: self.timeout.as_secs(),
            },
        };

        self.logger.error(&format!("[ToolExecutor] {}", error));
        ToolOutcome::Failure(error.to_string())
    }

    /// Resolve `name` in the registry and invoke it
    pub async fn execute(
        &self,
        registry: &ToolRegistry,
        name: &str,
        args: Map<String, Value>,
        ctx: &InvocationContext,
    ) -> ToolOutcome {
        match registry.lookup(name) {
            Some(descriptor) => self.invoke(&descriptor, args, ctx).await,
            None => {
                let error = ToolError::NotFound(name.to_string());
                self.logger.error(&format!("[ToolExecutor] {}", error));
                ToolOutcome::Failure(error.to_string())
            }
        }
    }
}

impl std::fmt::Debug for ToolExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolExecutor")
            .field("timeout", &self.timeout)
            .finish()
    }
}
