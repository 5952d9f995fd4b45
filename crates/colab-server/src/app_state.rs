use std::sync::Arc;

use colab_core::traits::CollaborationStore;
use colab_mcp::catalog::register_collaboration_tools;
use colab_mcp::{RegistryError, ToolRegistry};

use crate::rate_limit::{RateLimitConfig, RateLimiter};

/// Shared application state with injected dependencies.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CollaborationStore>,
    pub tools: Arc<ToolRegistry>,
    pub limiter: Arc<RateLimiter>,
    pub secret_key: Option<Arc<str>>,
}

impl AppState {
    /// Build state with the collaboration tool catalog registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog contains a duplicate tool name.
    pub fn new(
        store: Arc<dyn CollaborationStore>,
        rate_limit: RateLimitConfig,
        secret_key: Option<String>,
    ) -> Result<Self, RegistryError> {
        let mut tools = ToolRegistry::new();
        register_collaboration_tools(&mut tools, &store)?;
        Ok(Self::with_registry(store, tools, rate_limit, secret_key))
    }

    /// Build state around an already-populated registry.
    pub fn with_registry(
        store: Arc<dyn CollaborationStore>,
        tools: ToolRegistry,
        rate_limit: RateLimitConfig,
        secret_key: Option<String>,
    ) -> Self {
        Self {
            store,
            tools: Arc::new(tools),
            limiter: Arc::new(RateLimiter::new(rate_limit)),
            secret_key: secret_key.map(Arc::from),
        }
    }
}
