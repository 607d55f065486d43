//! MCP tool transport
//!
//! Both ends of the Model Context Protocol as used here: a client that runs
//! tools in a spawned server process, and the server that `quill serve-tools`
//! runs.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

pub use client::{McpClient, McpToolExecutor};
pub use error::McpError;
pub use server::McpServer;
pub use transport::{McpTransport, StdioTransport};
