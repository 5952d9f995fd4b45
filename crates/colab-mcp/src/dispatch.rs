use serde_json::{json, Value};

use crate::jsonrpc::{
    JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR,
};
use crate::tools::ToolRegistry;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "colab";

/// Route one parsed JSON-RPC body to the registry.
///
/// Returns `None` for notifications (an `id`-less `notifications/*` call),
/// which expect no response body. Every failure, including handler errors,
/// comes back as an error envelope carrying the request id.
pub async fn dispatch(registry: &ToolRegistry, body: &Value) -> Option<JsonRpcResponse> {
    let Some(req) = JsonRpcRequest::from_value(body) else {
        return Some(JsonRpcResponse::error(
            Value::Null,
            INVALID_REQUEST,
            "Invalid Request",
        ));
    };

    if body.get("id").is_none() && req.method.starts_with("notifications/") {
        tracing::debug!(method = %req.method, "notification received");
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(registry, &req),
        "tools/call" => handle_tools_call(registry, &req).await,
        _ => JsonRpcResponse::error_with_data(
            req.id,
            METHOD_NOT_FOUND,
            "Method not found",
            Value::String(req.method),
        ),
    };
    Some(response)
}

/// Error envelope for a body that is not valid JSON.
pub fn parse_error(detail: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse::error_with_data(
        Value::Null,
        PARSE_ERROR,
        "Parse error",
        Value::String(detail.into()),
    )
}

fn handle_initialize(req: &JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(
        req.id.clone(),
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn handle_tools_list(registry: &ToolRegistry, req: &JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(
        req.id.clone(),
        json!({ "tools": registry.list_tools() }),
    )
}

async fn handle_tools_call(registry: &ToolRegistry, req: &JsonRpcRequest) -> JsonRpcResponse {
    let params = req.params.as_ref();

    let Some(name) = params.and_then(|p| p.get("name")).and_then(Value::as_str) else {
        return JsonRpcResponse::error_with_data(
            req.id.clone(),
            INVALID_PARAMS,
            "Invalid params",
            Value::String("params.name must be a string".to_string()),
        );
    };

    let arguments = params.and_then(|p| p.get("arguments")).cloned();

    match registry.call_tool(name, arguments).await {
        Ok(result) => JsonRpcResponse::success(req.id.clone(), json!({ "content": result.content })),
        Err(err) => {
            let code = err.code();
            let message = if code == INVALID_PARAMS {
                "Invalid params"
            } else {
                tracing::warn!(tool = name, error = %err, "tool call failed");
                "Internal error"
            };
            JsonRpcResponse::error_with_data(
                req.id.clone(),
                code,
                message,
                Value::String(err.to_string()),
            )
        }
    }
}
