//! Error types for the MCP tool transport

use quill_domain::ToolError;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when talking to an MCP tool server
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Tool server command is empty")]
    EmptyCommand,

    #[error("Tool server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to parse message: {error}\nRaw message: {raw}")]
    ParseError { error: String, raw: String },

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Tool server closed the connection")]
    TransportClosed,

    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl McpError {
    /// The error as the model should see it in an error envelope.
    pub fn to_tool_error(&self) -> ToolError {
        match self {
            McpError::Timeout(method) => ToolError::timeout(method.clone()),
            other => ToolError::transport(other.to_string()),
        }
    }
}
