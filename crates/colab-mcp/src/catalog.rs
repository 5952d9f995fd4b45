//! Collaboration tools exposed over MCP.
//!
//! Each handler is a thin adapter over [`CollaborationStore`]: it validates
//! its arguments (rejecting rather than coercing), calls the store, and
//! reshapes the outcome into `{success, data}` or `{success: false, error}`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use colab_core::traits::CollaborationStore;
use colab_core::types::{CollaborationId, NewCollaboration};

use crate::error::{RegistryError, ToolError};
use crate::tools::{ToolDefinition, ToolHandler, ToolRegistry};

pub const LIST_COLLABORATIONS: &str = "list_collaborations";
pub const GET_COLLABORATION: &str = "get_collaboration";
pub const CREATE_COLLABORATION: &str = "create_collaboration";

/// Register every collaboration tool, in catalog order.
///
/// Call once while building the registry at startup.
///
/// # Errors
///
/// Fails if any tool name is already present in `registry`.
pub fn register_collaboration_tools(
    registry: &mut ToolRegistry,
    store: &Arc<dyn CollaborationStore>,
) -> Result<(), RegistryError> {
    let [list, get, create] = definitions();

    registry.register(
        list,
        ListCollaborations {
            store: Arc::clone(store),
        },
    )?;
    registry.register(
        get,
        GetCollaboration {
            store: Arc::clone(store),
        },
    )?;
    registry.register(
        create,
        CreateCollaboration {
            store: Arc::clone(store),
        },
    )?;
    Ok(())
}

/// Static definitions of the collaboration tools.
#[must_use]
pub fn definitions() -> [ToolDefinition; 3] {
    [
        ToolDefinition::new(
            LIST_COLLABORATIONS,
            "List all collaborations, newest first.",
            json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            result_schema(json!({
                "type": "array",
                "items": { "type": "object" }
            })),
        ),
        ToolDefinition::new(
            GET_COLLABORATION,
            "Fetch a single collaboration by its ID.",
            json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "UUID of the collaboration"
                    }
                },
                "required": ["id"]
            }),
            result_schema(json!({ "type": "object" })),
        ),
        ToolDefinition::new(
            CREATE_COLLABORATION,
            "Create a collaboration record from a title, participants and an optional transcript.",
            json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Title of the collaboration"
                    },
                    "description": {
                        "type": "string",
                        "description": "Short summary of the conversation"
                    },
                    "participants": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Names of the people who took part"
                    },
                    "transcript": {
                        "type": "string",
                        "description": "Raw transcript text"
                    }
                },
                "required": ["title"]
            }),
            result_schema(json!({ "type": "object" })),
        ),
    ]
}

fn result_schema(data: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "data": data,
            "error": { "type": "string" }
        },
        "required": ["success"]
    })
}

fn success(data: impl serde::Serialize) -> Result<Value, ToolError> {
    let data = serde_json::to_value(data).map_err(|e| ToolError::Failed(e.to_string()))?;
    Ok(json!({ "success": true, "data": data }))
}

fn failure(tool: &str, error: impl std::fmt::Display) -> Result<Value, ToolError> {
    tracing::warn!(tool, %error, "collaboration store call failed");
    Ok(json!({ "success": false, "error": error.to_string() }))
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing or invalid '{key}'")))
}

fn optional_str(args: &Value, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be a string"
        ))),
    }
}

fn optional_string_list(args: &Value, key: &str) -> Result<Vec<String>, ToolError> {
    let invalid = || ToolError::InvalidArguments(format!("'{key}' must be an array of strings"));
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}

struct ListCollaborations {
    store: Arc<dyn CollaborationStore>,
}

#[async_trait]
impl ToolHandler for ListCollaborations {
    async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
        match self.store.list_all().await {
            Ok(collaborations) => success(collaborations),
            Err(e) => failure(LIST_COLLABORATIONS, e),
        }
    }
}

struct GetCollaboration {
    store: Arc<dyn CollaborationStore>,
}

#[async_trait]
impl ToolHandler for GetCollaboration {
    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let id: CollaborationId = required_str(&arguments, "id")?
            .parse()
            .map_err(|e| ToolError::InvalidArguments(format!("invalid 'id': {e}")))?;

        match self.store.get_by_id(id).await {
            Ok(Some(collaboration)) => success(collaboration),
            Ok(None) => Ok(json!({ "success": false, "error": "Collaboration not found" })),
            Err(e) => failure(GET_COLLABORATION, e),
        }
    }
}

struct CreateCollaboration {
    store: Arc<dyn CollaborationStore>,
}

#[async_trait]
impl ToolHandler for CreateCollaboration {
    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let params = NewCollaboration {
            title: required_str(&arguments, "title")?.to_string(),
            description: optional_str(&arguments, "description")?.unwrap_or_default(),
            participants: optional_string_list(&arguments, "participants")?,
            transcript: optional_str(&arguments, "transcript")?,
            ..NewCollaboration::default()
        };
        params.validate()?;

        match self.store.create(params).await {
            Ok(collaboration) => success(collaboration),
            Err(e) => failure(CREATE_COLLABORATION, e),
        }
    }
}
