use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RegistryError, ToolError};

/// Definition of an MCP tool advertised through `tools/list`.
///
/// The schemas are advisory metadata for clients; the registry does not
/// enforce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(rename = "outputSchema")]
    pub output_schema: Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        output_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            output_schema,
        }
    }

    /// Names listed under the input schema's `required` key.
    pub fn required_arguments(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// The asynchronous function backing a tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Invoke the tool with its (possibly empty) argument object.
    async fn call(&self, arguments: Value) -> Result<Value, ToolError>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        (self)(arguments).await
    }
}

/// Result envelope of a successful `tools/call`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Value,
}

struct RegisteredTool {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

/// Catalog of invocable tools, keyed by unique name.
///
/// Built once during startup and then shared read-only, so lookups and calls
/// need no locking.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its definition's name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] for a blank name and
    /// [`RegistryError::DuplicateTool`] when the name is already taken; the
    /// existing entry is left untouched.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), RegistryError> {
        if definition.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.index.contains_key(&definition.name) {
            return Err(RegistryError::DuplicateTool(definition.name));
        }

        self.index.insert(definition.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            definition,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// All tool definitions, in registration order.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    /// Look up a tool definition by exact name.
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i].definition)
    }

    /// Invoke a tool by exact name.
    ///
    /// Omitted arguments are passed to the handler as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when no tool has that name, or the
    /// handler's own error unchanged.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolCallResult, ToolError> {
        let &i = self
            .index
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let handler = Arc::clone(&self.tools[i].handler);

        let arguments = arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let content = handler.call(arguments).await?;
        Ok(ToolCallResult { content })
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field(
                "tools",
                &self.tools.iter().map(|t| &t.definition.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition::new(
            name,
            format!("The {name} tool"),
            json!({"type": "object", "properties": {}, "required": []}),
            json!({"type": "object"}),
        )
    }

    async fn echo(arguments: Value) -> Result<Value, ToolError> {
        Ok(arguments)
    }

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ToolHandler for CountingHandler {
        async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"success": true}))
        }
    }

    #[test]
    fn list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["charlie", "alpha", "bravo"] {
            registry.register(definition(name), echo).unwrap();
        }

        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["charlie", "alpha", "bravo"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_registration_keeps_original() {
        let mut registry = ToolRegistry::new();
        registry.register(definition("echo"), echo).unwrap();

        let mut replacement = definition("echo");
        replacement.description = "replacement".to_string();
        let err = registry.register(replacement, echo).unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateTool(ref name) if name == "echo"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.definition("echo").unwrap().description,
            "The echo tool"
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        let err = registry.register(definition(""), echo).unwrap_err();
        assert!(matches!(err, RegistryError::EmptyName));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn call_wraps_handler_result_in_content() {
        let mut registry = ToolRegistry::new();
        registry.register(definition("echo"), echo).unwrap();

        let result = registry
            .call_tool("echo", Some(json!({"x": 1})))
            .await
            .unwrap();
        assert_eq!(result.content, json!({"x": 1}));
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"content": {"x": 1}}));
    }

    #[tokio::test]
    async fn call_defaults_arguments_to_empty_object() {
        let mut registry = ToolRegistry::new();
        registry.register(definition("echo"), echo).unwrap();

        let result = registry.call_tool("echo", None).await.unwrap();
        assert_eq!(result.content, json!({}));
    }

    #[tokio::test]
    async fn call_invokes_handler_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(
                definition("counted"),
                CountingHandler {
                    calls: Arc::clone(&calls),
                },
            )
            .unwrap();

        registry.call_tool("counted", None).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_invokes_no_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(
                definition("counted"),
                CountingHandler {
                    calls: Arc::clone(&calls),
                },
            )
            .unwrap();

        let err = registry.call_tool("missing", None).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "missing"));
        assert!(err.to_string().contains("missing"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_failure_propagates() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("broken"), |_args: Value| async {
                Err::<Value, _>(ToolError::Failed("boom".to_string()))
            })
            .unwrap();

        let err = registry.call_tool("broken", None).await.unwrap_err();
        assert!(matches!(err, ToolError::Failed(ref msg) if msg == "boom"));
    }

    #[test]
    fn definitions_serialize_with_schema_keys() {
        let json = serde_json::to_string(&definition("echo")).unwrap();
        assert!(json.contains("inputSchema"));
        assert!(json.contains("outputSchema"));
    }
}
