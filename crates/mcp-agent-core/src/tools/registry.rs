//! Tool registry
//!
//! Holds every tool discovered at startup, grouped by the server that
//! provided it. Names are sanitized on the way in so the same name is used
//! for binding to the model, for lookup, and for export.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::handle::ToolHandle;
use super::sanitize::NameSanitizer;
use super::schema::resolve_schema_or_empty;
use crate::logging::Logger;
use crate::types::Tool;

/// A registered tool
pub struct ToolDescriptor {
    /// Sanitized, registry-unique name
    pub name: String,
    /// Name as the provider knows it
    pub original_name: String,
    pub description: String,
    /// Full object schema bound to the model
    pub schema: Value,
    pub parameters: Map<String, Value>,
    pub required: Vec<String>,
    /// Server (or other source) that provided the tool
    pub group: String,
    pub handle: Arc<dyn ToolHandle>,
}

impl ToolDescriptor {
    /// Definition handed to the model
    pub fn to_llm_tool(&self) -> Tool {
        Tool::new(&self.name, &self.description).with_schema(self.schema.clone())
    }

    fn summary(&self) -> ToolSummary {
        ToolSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            required: self.required.clone(),
        }
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("original_name", &self.original_name)
            .field("group", &self.group)
            .finish()
    }
}

/// Exported view of one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub parameters: Map<String, Value>,
    pub required: Vec<String>,
}

/// Exported view of one server's tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerToolsInfo {
    pub name: String,
    pub tools: Vec<ToolSummary>,
    pub tool_count: usize,
}

/// Exported view of the whole registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsInfo {
    pub servers: IndexMap<String, ServerToolsInfo>,
    pub total_tools: usize,
    pub server_count: usize,
}

/// Registry of callable tools
pub struct ToolRegistry {
    tools: Vec<Arc<ToolDescriptor>>,
    by_name: HashMap<String, usize>,
    groups: IndexMap<String, Vec<usize>>,
    sanitizer: NameSanitizer,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
            groups: IndexMap::new(),
            sanitizer: NameSanitizer::new(),
            logger,
        }
    }

    /// Register a group's tools, returning the names they were given
    ///
    /// An empty `handles` still records the group, so a server whose tools
    /// could not be retrieved shows up with zero tools.
    pub fn register(&mut self, group: &str, handles: Vec<Arc<dyn ToolHandle>>) -> Vec<String> {
        self.groups.entry(group.to_string()).or_default();

        let mut names = Vec::with_capacity(handles.len());
        for handle in handles {
            let original_name = handle.name().to_string();
            let name = self.sanitizer.sanitize(&original_name);
            if name != original_name {
                self.logger.info(&format!(
                    "[ToolRegistry] Renamed tool '{}' -> '{}'",
                    original_name, name
                ));
            }

            let params = resolve_schema_or_empty(handle.as_ref(), |e| {
                self.logger.warn(&format!(
                    "[ToolRegistry] Ignoring schema of '{}' from '{}': {}",
                    original_name, group, e
                ));
            });

            let descriptor = ToolDescriptor {
                name: name.clone(),
                original_name,
                description: handle.description().to_string(),
                schema: params.schema,
                parameters: params.properties,
                required: params.required,
                group: group.to_string(),
                handle,
            };

            let index = self.tools.len();
            self.tools.push(Arc::new(descriptor));
            self.by_name.insert(name.clone(), index);
            if let Some(members) = self.groups.get_mut(group) {
                members.push(index);
            }
            names.push(name);
        }

        self.logger.info(&format!(
            "[ToolRegistry] Registered {} tool(s) for '{}'",
            names.len(),
            group
        ));
        names
    }

    /// Exact-match lookup by sanitized name
    pub fn lookup(&self, name: &str) -> Option<Arc<ToolDescriptor>> {
        self.by_name.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    /// All tools in registration order
    pub fn all_tools(&self) -> &[Arc<ToolDescriptor>] {
        &self.tools
    }

    /// Tools per group in registration order
    pub fn grouped_tools(&self) -> IndexMap<&str, Vec<&ToolDescriptor>> {
        self.groups
            .iter()
            .map(|(group, members)| {
                let tools = members.iter().map(|&i| self.tools[i].as_ref()).collect();
                (group.as_str(), tools)
            })
            .collect()
    }

    /// Tool definitions to bind to the model
    pub fn llm_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.to_llm_tool()).collect()
    }

    /// Metadata export for callers
    pub fn describe(&self) -> ToolsInfo {
        let servers: IndexMap<String, ServerToolsInfo> = self
            .grouped_tools()
            .into_iter()
            .map(|(group, tools)| {
                let tools: Vec<ToolSummary> = tools.iter().map(|t| t.summary()).collect();
                let info = ServerToolsInfo {
                    name: group.to_string(),
                    tool_count: tools.len(),
                    tools,
                };
                (group.to_string(), info)
            })
            .collect();

        ToolsInfo {
            total_tools: self.tools.len(),
            server_count: servers.len(),
            servers,
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.len())
            .field("groups", &self.groups.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{MemoryLogger, NoOpLogger};
    use crate::tools::handle::FunctionTool;
    use serde_json::json;

    fn tool(name: &str) -> Arc<dyn ToolHandle> {
        Arc::new(
            FunctionTool::new(name, format!("{} tool", name), |_args, _ctx| async move {
                Ok("ok".to_string())
            })
            .with_inline_schema(json!({
                "type": "object",
                "properties": {"q": {"type": "string"}},
                "required": ["q"]
            })),
        )
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new(Arc::new(NoOpLogger));
        registry.register("weather", vec![tool("forecast"), tool("alerts")]);
        registry.register("search", vec![tool("web.search"), tool("forecast")]);
        registry.register("broken", Vec::new());
        registry
    }

    #[test]
    fn test_register_sanitizes_and_deduplicates() {
        let registry = registry();
        let names: Vec<&str> = registry.all_tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["forecast", "alerts", "web_search", "forecast_2"]);

        let renamed = registry.lookup("forecast_2").unwrap();
        assert_eq!(renamed.original_name, "forecast");
        assert_eq!(renamed.group, "search");
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = registry();
        assert!(registry.lookup("web_search").is_some());
        assert!(registry.lookup("web.search").is_none());
        assert!(registry.lookup("Forecast").is_none());
    }

    #[test]
    fn test_grouped_tools_keep_order_and_empty_groups() {
        let registry = registry();
        let grouped = registry.grouped_tools();
        let groups: Vec<&str> = grouped.keys().copied().collect();
        assert_eq!(groups, vec!["weather", "search", "broken"]);
        assert!(grouped["broken"].is_empty());
        assert_eq!(registry.group_count(), 3);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_describe_shape() {
        let info = registry().describe();
        assert_eq!(info.total_tools, 4);
        assert_eq!(info.server_count, 3);
        assert_eq!(info.servers["broken"].tool_count, 0);

        let value = serde_json::to_value(&info).unwrap();
        let forecast = &value["servers"]["weather"]["tools"][0];
        assert_eq!(forecast["name"], "forecast");
        assert_eq!(forecast["description"], "forecast tool");
        assert_eq!(forecast["parameters"]["q"]["type"], "string");
        assert_eq!(forecast["required"], json!(["q"]));
        assert_eq!(value["servers"]["weather"]["name"], "weather");
    }

    #[test]
    fn test_describe_is_pure() {
        let registry = registry();
        assert_eq!(registry.describe(), registry.describe());
    }

    #[test]
    fn test_malformed_schema_is_tolerated() {
        let logger = Arc::new(MemoryLogger::new());
        let mut registry = ToolRegistry::new(logger.clone());
        let bad: Arc<dyn ToolHandle> = Arc::new(
            FunctionTool::new("bad", "", |_args, _ctx| async move { Ok(String::new()) })
                .with_inline_schema(json!({"properties": "nope"})),
        );
        registry.register("misc", vec![bad]);

        let info = registry.describe();
        assert!(info.servers["misc"].tools[0].parameters.is_empty());
        assert!(logger.contains("warn", "Ignoring schema of 'bad'"));
    }

    #[test]
    fn test_llm_tools_use_sanitized_names() {
        let tools = registry().llm_tools();
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[2].name, "web_search");
        assert_eq!(
            tools[2].input_schema.as_ref().unwrap()["required"],
            json!(["q"])
        );
    }
}
