pub mod error;
pub mod traits;
pub mod types;

pub use error::Error;
pub use types::{
    ActionItem, Collaboration, CollaborationId, EventMetadata, ExtractedAnswer, NewCollaboration,
};
