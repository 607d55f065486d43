//! Tool domain module
//!
//! Defines how the model reaches local operations: every tool is described by
//! a [`ToolDefinition`], requested through a [`ToolCall`] and answered with a
//! [`ToolResultEnvelope`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌────────────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResultEnvelope │
//! │ (catalog)    │    │ (request)    │    │ (outcome + detail) │
//! └──────────────┘    └──────────────┘    └────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolSpec`] — Registration-ordered catalog of tool definitions
//! - [`ToolDefinition`] — Name, description and parameter contract of one tool
//! - [`ToolCall`] — A parsed invocation request with its argument object
//! - [`ToolResultEnvelope`] — What a tool reports back to the model
//! - [`ToolError`] — Coded failure raised by a handler or by validation
//! - [`ToolValidator`] — Pure argument validation, including default filling
//!
//! # Architecture
//!
//! - **Domain** (this module): Pure definitions, no I/O
//! - **Application** (`ToolExecutorPort`): Port trait for tool execution
//! - **Infrastructure** (`LocalToolExecutor`, `McpToolExecutor`): Concrete
//!   execution against the filesystem or a remote tool server

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolOutcome, ToolResultEnvelope};
