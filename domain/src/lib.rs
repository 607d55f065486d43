//! Domain layer for quill
//!
//! This crate contains the core entities, value objects and pure logic of the
//! tool-invocation loop. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! - **Conversation**: ordered user/assistant turns, the model's context
//! - **Tool catalog**: [`ToolSpec`] of [`ToolDefinition`]s, rendered into
//!   instructions by the [`PromptAssembler`]
//! - **Grammar**: an [`InvocationParser`] turns raw completions into
//!   [`ToolCall`]s; prose never parses as a call
//! - **Envelope**: every call ends as a [`ToolResultEnvelope`] fed back to
//!   the model

pub mod config;
pub mod conversation;
pub mod core;
pub mod grammar;
pub mod orchestration;
pub mod prompt;
pub mod tool;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity, TransportMode};
pub use conversation::{Conversation, Role, Turn};
pub use core::error::DomainError;
pub use grammar::{
    GrammarKind, InvocationParser, LineGrammar, MalformedCallPolicy, ParseOutcome,
    RejectedCandidate, WholeMessageGrammar,
};
pub use orchestration::{ExecutionMode, LoopState};
pub use prompt::{PromptAssembler, RESULT_PREFIX};
pub use tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolOutcome, ToolResultEnvelope},
};
