//! Tool Executor port
//!
//! Defines the interface for executing tool calls, wherever the tools live.

use async_trait::async_trait;
use quill_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolResultEnvelope,
};

/// Port for tool execution
///
/// `execute` never fails: unknown tools, bad arguments, handler failures and
/// transport failures all come back as error envelopes for the model to read.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().contains(name)
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Execute a tool call
    async fn execute(&self, call: &ToolCall) -> ToolResultEnvelope;
}
