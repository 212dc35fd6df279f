use crate::tools::weather::WeatherTool;
use crate::tools::wikipedia::WikipediaTool;
use crate::types::{AppError, Result};
use crate::utils::toml_config::SageConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    async fn execute(&self, args: Value) -> Result<Value>;
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry holding the tools enabled in configuration
    pub fn from_config(config: &SageConfig) -> Result<Self> {
        let mut registry = Self::new();

        if config.weather.enabled {
            let weather = WeatherTool::from_config(&config.weather, config.weather_api_key())?;
            registry.register(Arc::new(weather));
        }

        if config.wikipedia.enabled {
            registry.register(Arc::new(WikipediaTool::from_config(&config.wikipedia)?));
        }

        info!(tools = ?registry.tool_names(), "Tool registry ready");
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        if let Some(tool) = self.tools.get(name) {
            tool.execute(args).await
        } else {
            Err(AppError::NotFound(format!("Tool not found: {}", name)))
        }
    }

    /// Get a list of all registered tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        async fn execute(&self, args: Value) -> Result<Value> {
            Ok(args)
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.tool_names().len(), 0);
    }

    #[test]
    fn test_from_config_respects_enabled_flags() {
        let mut config = SageConfig::default();
        let registry = ToolRegistry::from_config(&config).unwrap();
        assert_eq!(registry.tool_names(), vec!["weather", "wikipedia"]);

        config.weather.enabled = false;
        let registry = ToolRegistry::from_config(&config).unwrap();
        assert!(!registry.has_tool("weather"));
        assert!(registry.has_tool("wikipedia"));
    }

    #[tokio::test]
    async fn test_execute_registered_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let value = registry.execute("echo", json!({ "x": 1 })).await.unwrap();
        assert_eq!(value["x"], 1);
    }

    #[tokio::test]
    async fn test_nonexistent_tool() {
        let registry = ToolRegistry::new();

        let result = registry.execute("nonexistent_tool", json!({})).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
