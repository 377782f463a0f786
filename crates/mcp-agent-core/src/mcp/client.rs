//! MCP client using the official rmcp SDK
//!
//! Connects to tool servers over the streamable HTTP transport.

use std::sync::Arc;

use rmcp::{
    ServiceExt,
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        RawContent, Tool,
    },
    service::RunningService,
    transport::StreamableHttpClientTransport,
    RoleClient,
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ServerConfig;
use crate::logging::Logger;

/// Transport names accepted in `mcp.json`
pub const SUPPORTED_TRANSPORTS: &[&str] = &["streamable_http", "http"];

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Server '{0}' has no url configured")]
    MissingUrl(String),

    #[error("Unsupported transport '{transport}' for server '{server}'")]
    UnsupportedTransport { server: String, transport: String },

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// A live session with one tool server
pub struct McpClient {
    server_name: String,
    client: RunningService<RoleClient, ClientInfo>,
    logger: Arc<dyn Logger>,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "mcp-agent".to_string(),
            title: Some("MCP Agent".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

impl McpClient {
    /// Connect to the server described by a config entry
    pub async fn connect(
        server_name: &str,
        server: &ServerConfig,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        let transport = server.transport.as_deref().unwrap_or("streamable_http");
        if !SUPPORTED_TRANSPORTS.contains(&transport) {
            return Err(McpError::UnsupportedTransport {
                server: server_name.to_string(),
                transport: transport.to_string(),
            });
        }

        let url = server
            .url()
            .ok_or_else(|| McpError::MissingUrl(server_name.to_string()))?;

        if !server.options.is_empty() {
            let keys: Vec<&str> = server.options.keys().map(String::as_str).collect();
            logger.debug(&format!(
                "[McpClient] Ignoring options for '{}': {}",
                server_name,
                keys.join(", ")
            ));
        }

        Self::connect_http(server_name, url, logger).await
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(
        server_name: &str,
        url: &str,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting to '{}' at {}", server_name, url));

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info(&format!("[McpClient] Connected to '{}'", server_name));

        Ok(Self {
            server_name: server_name.to_string(),
            client,
            logger,
        })
    }

    /// Name of the server in the config file
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// List all available tools
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] '{}' listed {} tools",
            self.server_name,
            result.tools.len()
        ));

        Ok(result.tools)
    }

    /// Call a tool by its original (server-side) name
    pub async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> McpResult<CallToolResult> {
        self.logger.info(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        self.client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Close the connection
    pub async fn close(self) -> McpResult<()> {
        self.logger.info(&format!("[McpClient] Closing '{}'", self.server_name));
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("server_name", &self.server_name)
            .finish()
    }
}

/// Join the text parts of a tool result
///
/// Results flagged as errors come back as `Err` with the same text.
pub fn result_text(result: &CallToolResult) -> Result<String, String> {
    let mut text = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        if let Some(structured) = &result.structured_content {
            text = structured.to_string();
        }
    }

    if result.is_error.unwrap_or(false) {
        Err(if text.is_empty() {
            "tool reported an error".to_string()
        } else {
            text
        })
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use rmcp::model::Content;

    #[tokio::test]
    async fn test_unsupported_transport_is_rejected() {
        let server = ServerConfig {
            url: Some("http://localhost:1/mcp".into()),
            transport: Some("stdio".into()),
            ..Default::default()
        };
        let err = McpClient::connect("local", &server, Arc::new(NoOpLogger))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::UnsupportedTransport { .. }));
        assert!(err.to_string().contains("stdio"));
    }

    #[tokio::test]
    async fn test_missing_url_is_rejected() {
        let err = McpClient::connect("empty", &ServerConfig::default(), Arc::new(NoOpLogger))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::MissingUrl(name) if name == "empty"));
    }

    #[test]
    fn test_result_text_joins_text_parts() {
        let result = CallToolResult::success(vec![Content::text("a"), Content::text("b")]);
        assert_eq!(result_text(&result), Ok("a\nb".to_string()));
    }

    #[test]
    fn test_result_text_error_flag() {
        let result = CallToolResult::error(vec![Content::text("bad input")]);
        assert_eq!(result_text(&result), Err("bad input".to_string()));
    }
}
