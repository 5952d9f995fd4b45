use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde_json::{json, Value};

/// Minimal JSON-RPC client for a Co.Lab `/mcp` endpoint.
pub struct RpcClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/mcp", base_url.trim_end_matches('/')),
            api_key,
            next_id: AtomicU64::new(1),
        }
    }

    /// Send one request and return its `result`, or fail with the error object.
    pub async fn call(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let body: Value = resp.json().await?;
        tracing::debug!(%status, method, "rpc response");

        if let Some(error) = body.get("error") {
            anyhow::bail!(
                "{method} failed ({status}): {}",
                serde_json::to_string_pretty(error)?
            );
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{method}: response has neither result nor error"))
    }

    pub async fn list_tools(&self) -> anyhow::Result<Vec<Value>> {
        let result = self.call("tools/list", json!({})).await?;
        Ok(result["tools"].as_array().cloned().unwrap_or_default())
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> anyhow::Result<Value> {
        let result = self
            .call("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        Ok(result["content"].clone())
    }
}

/// Remote smoke test: the server lists at least one tool and the first tool
/// taking no required arguments can be called.
pub async fn self_test(client: &RpcClient) -> anyhow::Result<()> {
    let tools = client.list_tools().await?;
    if tools.is_empty() {
        anyhow::bail!("server reports no tools");
    }

    let target = tools
        .iter()
        .find(|t| {
            t["inputSchema"]["required"]
                .as_array()
                .is_none_or(Vec::is_empty)
        })
        .and_then(|t| t["name"].as_str())
        .ok_or_else(|| anyhow::anyhow!("no tool can be called without arguments"))?;

    let content = client.call_tool(target, json!({})).await?;
    println!("{} tools registered; '{target}' returned:", tools.len());
    println!("{}", serde_json::to_string_pretty(&content)?);
    Ok(())
}
