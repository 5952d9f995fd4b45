use crate::types::CollaborationId;

/// Core error type for the Co.Lab domain.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("collaboration not found: {0}")]
    CollaborationNotFound(CollaborationId),

    #[error("invalid collaboration: {0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}
