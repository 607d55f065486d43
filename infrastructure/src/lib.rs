//! Infrastructure layer for quill
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: filesystem tools, the MCP tool transport (client and
//! server), inference backends, configuration file loading and the JSONL
//! conversation trace.

pub mod config;
pub mod logging;
pub mod mcp;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig};
pub use logging::JsonlConversationLogger;
pub use mcp::{McpError, McpServer, McpToolExecutor};
pub use providers::{AnthropicGateway, OllamaGateway, ProviderKind, build_gateway};
pub use tools::{
    JsonSchemaToolConverter, LocalToolExecutor, PathResolver, ToolRegistry, default_registry,
};
