pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod jsonrpc;
pub mod self_test;
pub mod tools;

pub use dispatch::dispatch;
pub use error::{RegistryError, ToolError};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use tools::{ToolCallResult, ToolDefinition, ToolHandler, ToolRegistry};
