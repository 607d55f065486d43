//! Turn progress notification port
//!
//! [`TurnProgressNotifier`] is an **output port** the presentation layer
//! implements to show what the orchestration loop is doing. All methods
//! default to no-ops so implementers override only what they display.

use quill_domain::{LoopState, RejectedCandidate, ToolCall, ToolResultEnvelope};

/// Callbacks fired while a session runs.
pub trait TurnProgressNotifier: Send + Sync {
    /// Called on every state transition of the loop
    fn on_state_change(&self, _state: LoopState) {}

    /// Called before each inference call; `iteration` starts at 1 per turn
    fn on_inference_start(&self, _iteration: usize) {}

    /// Called when the inference call returns, successfully or not
    fn on_inference_end(&self) {}

    /// Called before a tool call is dispatched
    fn on_tool_call(&self, _call: &ToolCall) {}

    /// Called when a tool call produced its envelope
    fn on_tool_result(&self, _call: &ToolCall, _envelope: &ToolResultEnvelope) {}

    /// Called when marker-carrying text failed to parse
    fn on_malformed_calls(&self, _rejected: &[RejectedCandidate]) {}

    /// Called with the final answer of a turn
    fn on_answer(&self, _answer: &str) {}

    /// Called when a turn failed; the session goes on
    fn on_turn_error(&self, _message: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl TurnProgressNotifier for NoProgress {}
