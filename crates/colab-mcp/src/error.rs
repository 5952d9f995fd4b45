use crate::jsonrpc::{INTERNAL_ERROR, INVALID_PARAMS};

/// Configuration errors raised while building the tool registry.
///
/// These are fatal: startup aborts when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool name must not be empty")]
    EmptyName,

    #[error("tool already registered: {0}")]
    DuplicateTool(String),
}

/// Errors raised while invoking a tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The caller supplied missing or mistyped arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The handler itself failed.
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    /// The JSON-RPC error code this failure is reported under.
    pub fn code(&self) -> i32 {
        match self {
            Self::UnknownTool(_) | Self::InvalidArguments(_) => INVALID_PARAMS,
            Self::Failed(_) => INTERNAL_ERROR,
        }
    }
}

impl From<colab_core::Error> for ToolError {
    fn from(err: colab_core::Error) -> Self {
        match err {
            colab_core::Error::Invalid(msg) => Self::InvalidArguments(msg),
            other => Self::Failed(other.to_string()),
        }
    }
}
