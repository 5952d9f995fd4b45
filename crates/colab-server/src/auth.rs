use axum::http::{header, HeaderMap};

/// Custom header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extract the key a client presented, from `X-API-Key` or a bearer token.
pub fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key);
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Whether the request may proceed. Without a configured secret every request
/// is allowed; otherwise the presented key must match exactly.
pub fn is_authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    match secret {
        None => true,
        Some(secret) => presented_key(headers) == Some(secret),
    }
}
