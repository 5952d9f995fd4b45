use axum::{
    routing::{any, get},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::app_state::AppState;
use crate::handlers;

/// Create the main application router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // MCP JSON-RPC endpoint. Non-POST methods reach the handler so they
        // get a JSON-RPC error body alongside the 405.
        .route("/mcp", any(handlers::mcp_request))
        // Collaboration REST API
        .route(
            "/api/collaborations",
            get(handlers::list_collaborations).post(handlers::create_collaboration),
        )
        .route("/api/collaborations/{id}", get(handlers::get_collaboration))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
