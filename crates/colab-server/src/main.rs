use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use colab_server::app_state::AppState;
use colab_server::config::ServerConfig;

use colab_store::PgStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env().expect("Invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let store = PgStore::new(pool);
    store.migrate().await.expect("Failed to run migrations");

    let state = AppState::new(
        Arc::new(store),
        config.rate_limit,
        config.secret_key.clone(),
    )
    .expect("Failed to register tools");

    tracing::info!(
        tools = state.tools.len(),
        auth = state.secret_key.is_some(),
        "tool registry ready"
    );

    if config.self_test {
        colab_mcp::self_test::run(&state.tools)
            .await
            .expect("Tool self-test failed");
    }

    let app = colab_server::router::create_router(state);

    let addr = config.bind_addr();
    tracing::info!("Co.Lab server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
