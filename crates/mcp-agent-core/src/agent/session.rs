//! Per-session context kept by the agent

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State tagged to one caller session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub id: String,
    /// Turns started in this session
    pub turns: u64,
    /// Free-form data callers attach to the session
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Synchronized map of session contexts
///
/// Entries live as long as the agent unless removed with `forget`.
#[derive(Debug, Default)]
pub struct SessionContexts {
    inner: Mutex<HashMap<String, SessionContext>>,
}

impl SessionContexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a new turn for `id`, creating the context on first use
    pub fn begin_turn(&self, id: &str) -> SessionContext {
        let mut sessions = self.inner.lock();
        let ctx = sessions.entry(id.to_string()).or_insert_with(|| SessionContext {
            id: id.to_string(),
            ..Default::default()
        });
        ctx.turns += 1;
        ctx.clone()
    }

    pub fn get(&self, id: &str) -> Option<SessionContext> {
        self.inner.lock().get(id).cloned()
    }

    /// Attach a value to an existing session; false if the session is unknown
    pub fn set_data(&self, id: &str, key: impl Into<String>, value: Value) -> bool {
        match self.inner.lock().get_mut(id) {
            Some(ctx) => {
                ctx.data.insert(key.into(), value);
                true
            }
            None => false,
        }
    }

    pub fn forget(&self, id: &str) -> Option<SessionContext> {
        self.inner.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
