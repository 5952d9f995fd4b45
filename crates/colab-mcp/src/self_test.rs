//! Smoke test run directly against a built registry.

use serde_json::{json, Value};

use crate::tools::ToolRegistry;

#[derive(Debug, thiserror::Error)]
pub enum SelfTestError {
    #[error("no tools registered")]
    NoTools,

    #[error("no registered tool can be called without arguments")]
    NoCallableTool,

    #[error("tool '{name}' failed: {message}")]
    ToolFailed { name: String, message: String },
}

/// Outcome of a successful self-test.
#[derive(Debug, Clone)]
pub struct SelfTestReport {
    pub tool_count: usize,
    pub checked_tool: String,
    pub content: Value,
}

/// Assert that at least one tool is registered and callable.
///
/// The target is the first tool (in registration order) whose input schema
/// requires no arguments; it is called with `{}`.
///
/// # Errors
///
/// See [`SelfTestError`].
pub async fn run(registry: &ToolRegistry) -> Result<SelfTestReport, SelfTestError> {
    if registry.is_empty() {
        return Err(SelfTestError::NoTools);
    }

    let target = registry
        .list_tools()
        .into_iter()
        .find(|t| t.required_arguments().is_empty())
        .ok_or(SelfTestError::NoCallableTool)?;

    let result = registry
        .call_tool(&target.name, Some(json!({})))
        .await
        .map_err(|e| SelfTestError::ToolFailed {
            name: target.name.clone(),
            message: e.to_string(),
        })?;

    tracing::info!(
        tools = registry.len(),
        checked_tool = %target.name,
        "self-test passed"
    );

    Ok(SelfTestReport {
        tool_count: registry.len(),
        checked_tool: target.name,
        content: result.content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tools::ToolDefinition;

    fn definition(name: &str, required: &[&str]) -> ToolDefinition {
        ToolDefinition::new(
            name,
            name,
            json!({"type": "object", "required": required}),
            json!({"type": "object"}),
        )
    }

    #[tokio::test]
    async fn empty_registry_fails() {
        let err = run(&ToolRegistry::new()).await.unwrap_err();
        assert!(matches!(err, SelfTestError::NoTools));
    }

    #[tokio::test]
    async fn calls_first_argument_free_tool() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("needs_id", &["id"]), |_args: Value| async {
                Err::<Value, _>(ToolError::InvalidArguments("missing 'id'".to_string()))
            })
            .unwrap();
        registry
            .register(definition("ping", &[]), |_args: Value| async {
                Ok::<_, ToolError>(json!({"success": true}))
            })
            .unwrap();

        let report = run(&registry).await.unwrap();
        assert_eq!(report.tool_count, 2);
        assert_eq!(report.checked_tool, "ping");
        assert_eq!(report.content["success"], true);
    }

    #[tokio::test]
    async fn all_tools_needing_arguments_fails() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("needs_id", &["id"]), |args: Value| async move {
                Ok::<_, ToolError>(args)
            })
            .unwrap();

        let err = run(&registry).await.unwrap_err();
        assert!(matches!(err, SelfTestError::NoCallableTool));
    }

    #[tokio::test]
    async fn failing_tool_is_reported() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("ping", &[]), |_args: Value| async {
                Err::<Value, _>(ToolError::Failed("offline".to_string()))
            })
            .unwrap();

        let err = run(&registry).await.unwrap_err();
        assert!(
            matches!(err, SelfTestError::ToolFailed { ref name, ref message } if name == "ping" && message == "offline")
        );
    }
}
