//! File-based tool server configuration (JSON)
//!
//! The file looks like:
//!
//! ```json
//! {
//!   "servers": {
//!     "weather": { "url": "http://localhost:8000/mcp", "transport": "streamable_http" }
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ConfigError, ConfigResult};
use crate::logging::Logger;

/// Default file name for the tool server configuration
pub const CONFIG_FILE_NAME: &str = "mcp.json";

/// Contents of `mcp.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpConfig {
    /// Tool servers by name, in file order
    #[serde(default)]
    pub servers: IndexMap<String, ServerConfig>,
}

impl McpConfig {
    /// Add or replace a server entry
    pub fn with_server(mut self, name: impl Into<String>, server: ServerConfig) -> Self {
        self.servers.insert(name.into(), server);
        self
    }
}

/// One remote tool server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Transport name (`streamable_http` when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    /// Any other provider-specific connection options, kept verbatim
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ServerConfig {
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// The configured url, if non-blank
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Reads and writes `mcp.json`
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use mcp_agent_core::config::ConfigStore;
/// use mcp_agent_core::logging::NoOpLogger;
///
/// let store = ConfigStore::user(Arc::new(NoOpLogger));
/// let config = store.load();
/// println!("{} servers", config.servers.len());
/// ```
pub struct ConfigStore {
    path: PathBuf,
    logger: Arc<dyn Logger>,
}

impl ConfigStore {
    /// Create a store for a specific path
    pub fn new(path: impl Into<PathBuf>, logger: Arc<dyn Logger>) -> Self {
        Self {
            path: path.into(),
            logger,
        }
    }

    /// Create a user-level store (~/.config/mcp-agent/mcp.json)
    pub fn user(logger: Arc<dyn Logger>) -> Self {
        // Use XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("mcp-agent").join(CONFIG_FILE_NAME), logger)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the file; `Ok(None)` when it does not exist
    pub fn try_load(&self) -> ConfigResult<Option<McpConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let config: McpConfig = serde_json::from_str(&content)?;
        Ok(Some(config))
    }

    /// Load the config, never failing
    ///
    /// A missing file is created with the empty default. A malformed file is
    /// left untouched and the empty default is used in memory.
    pub fn load(&self) -> McpConfig {
        match self.try_load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = McpConfig::default();
                if let Err(e) = self.save(&config) {
                    self.logger.error(&format!(
                        "[ConfigStore] Failed to write default config to {}: {}",
                        self.path.display(),
                        e
                    ));
                } else {
                    self.logger.info(&format!(
                        "[ConfigStore] Created default config at {}",
                        self.path.display()
                    ));
                }
                config
            }
            Err(e) => {
                self.logger.warn(&format!(
                    "[ConfigStore] Failed to load {}, using empty default: {}",
                    self.path.display(),
                    e
                ));
                McpConfig::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self, config: &McpConfig) -> ConfigResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::Other(format!("Failed to serialize JSON: {}", e)))?;

        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}
