mod collaborations;
mod health;
mod mcp;

pub use collaborations::{create_collaboration, get_collaboration, list_collaborations};
pub use health::health;
pub use mcp::mcp_request;
