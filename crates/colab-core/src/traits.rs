use async_trait::async_trait;

use crate::error::Error;
use crate::types::{Collaboration, CollaborationId, NewCollaboration};

/// Data-access layer for collaboration records.
#[async_trait]
pub trait CollaborationStore: Send + Sync {
    /// List every collaboration, newest first.
    async fn list_all(&self) -> Result<Vec<Collaboration>, Error>;

    /// Fetch a single collaboration. Absence is `Ok(None)`, not an error.
    async fn get_by_id(&self, id: CollaborationId) -> Result<Option<Collaboration>, Error>;

    /// Persist a new collaboration and return the stored record.
    async fn create(&self, params: NewCollaboration) -> Result<Collaboration, Error>;
}
