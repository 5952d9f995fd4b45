use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::to_bytes,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use colab_mcp::dispatch::{dispatch, parse_error};
use colab_mcp::jsonrpc::{INVALID_REQUEST, RATE_LIMITED, UNAUTHORIZED};
use colab_mcp::JsonRpcResponse;

use crate::app_state::AppState;
use crate::auth;
use crate::rate_limit::{client_identity, RateDecision};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Handle MCP JSON-RPC requests.
///
/// Gates run in order (method, auth, rate limit) before the body is read.
/// Exactly one log line is emitted per request whatever the outcome.
pub async fn mcp_request(State(state): State<AppState>, request: Request) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let mut log = RequestLog::new(client_identity(request.headers(), peer));

    handle(&state, &mut log, request).await
}

/// Writes the per-request log line when dropped, including when the request
/// future is cancelled before a response exists.
struct RequestLog {
    started: Instant,
    client: String,
    method: String,
    id: Value,
}

impl RequestLog {
    fn new(client: String) -> Self {
        Self {
            started: Instant::now(),
            client,
            method: "-".to_string(),
            id: Value::Null,
        }
    }

    fn record(&mut self, method: &str, id: Value) {
        self.method = method.to_string();
        self.id = id;
    }
}

impl Drop for RequestLog {
    fn drop(&mut self) {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            method = %self.method,
            id = %self.id,
            client = %self.client,
            elapsed_ms,
            "mcp request"
        );
    }
}

fn rejected(status: StatusCode, rpc: JsonRpcResponse) -> Response {
    (status, Json(rpc)).into_response()
}

async fn handle(state: &AppState, log: &mut RequestLog, request: Request) -> Response {
    if request.method() != Method::POST {
        let mut response = rejected(
            StatusCode::METHOD_NOT_ALLOWED,
            JsonRpcResponse::error(Value::Null, INVALID_REQUEST, "Method not allowed"),
        );
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("POST"));
        return response;
    }

    if !auth::is_authorized(request.headers(), state.secret_key.as_deref()) {
        return rejected(
            StatusCode::UNAUTHORIZED,
            JsonRpcResponse::error(Value::Null, UNAUTHORIZED, "Unauthorized"),
        );
    }

    if let RateDecision::Limited { retry_after } = state.limiter.check(&log.client).await {
        let mut response = rejected(
            StatusCode::TOO_MANY_REQUESTS,
            JsonRpcResponse::error(Value::Null, RATE_LIMITED, "Too many requests"),
        );
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        return response;
    }

    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return rejected(StatusCode::OK, parse_error(e.to_string())),
    };

    let body: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => return rejected(StatusCode::OK, parse_error(e.to_string())),
    };

    log.record(
        body.get("method").and_then(Value::as_str).unwrap_or("-"),
        body.get("id").cloned().unwrap_or(Value::Null),
    );

    match dispatch(&state.tools, &body).await {
        Some(rpc) => (StatusCode::OK, Json(rpc)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    #[test]
    fn request_log_is_written_once_on_drop() {
        let (captured, _guard) = capture();

        let mut log = RequestLog::new("203.0.113.7".to_string());
        log.record("tools/call", json!(4));
        drop(log);

        let lines = captured.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("mcp request"));
        assert!(lines[0].contains("method=tools/call"));
        assert!(lines[0].contains("id=4"));
        assert!(lines[0].contains("client=203.0.113.7"));
    }

    #[tokio::test]
    async fn request_log_is_written_when_the_request_is_cancelled() {
        let (captured, _guard) = capture();

        let request = async {
            let _log = RequestLog::new("198.51.100.3".to_string());
            std::future::pending::<()>().await;
        };
        let result = tokio::time::timeout(Duration::from_millis(10), request).await;
        assert!(result.is_err());

        let lines = captured.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("method=-"));
        assert!(lines[0].contains("client=198.51.100.3"));
    }
}
