//! Configuration for the agent
//!
//! Two sources:
//! - `ConfigStore`: the JSON `mcp.json` file listing tool servers
//! - `AgentSettings`: `OPENAI_*` environment variables (and `.env`)

mod error;
mod file;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use file::{ConfigStore, McpConfig, ServerConfig, CONFIG_FILE_NAME};
pub use settings::{
    AgentSettings, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
