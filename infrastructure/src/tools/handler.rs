//! Uniform handler signature shared by every tool
//!
//! A handler receives a call whose arguments were already validated and
//! completed with defaults. It returns an envelope for every outcome the
//! model should react to (including `not_found`), and a [`ToolError`] only
//! for failures. The executor turns those errors into error envelopes.

use quill_domain::{ToolCall, ToolError, ToolResultEnvelope};

pub trait ToolHandler: Send + Sync {
    /// Run the tool. Called from a blocking thread, so plain `std::fs` is fine.
    fn call(&self, call: &ToolCall) -> Result<ToolResultEnvelope, ToolError>;

    /// Path or target to report when the call fails before producing an
    /// envelope. Defaults to the tool name.
    fn target(&self, call: &ToolCall) -> String {
        call.tool_name.clone()
    }
}

/// Plain functions and closures are handlers too.
impl<F> ToolHandler for F
where
    F: Fn(&ToolCall) -> Result<ToolResultEnvelope, ToolError> + Send + Sync,
{
    fn call(&self, call: &ToolCall) -> Result<ToolResultEnvelope, ToolError> {
        self(call)
    }
}
