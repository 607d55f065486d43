//! Tool domain value objects — result envelopes and error types
//!
//! Every tool invocation, successful or not, ends as a [`ToolResultEnvelope`].
//! Failures carry a [`ToolError`] in their detail so the model can read what
//! went wrong and decide how to continue.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error that occurred while validating or running a tool.
///
/// | Code | Description |
/// |------|-------------|
/// | `INVALID_ARGUMENT` | Missing/wrong parameters |
/// | `NOT_FOUND` | Unknown tool or missing resource |
/// | `EXECUTION_FAILED` | Runtime failure (I/O error, decode error) |
/// | `PERMISSION_DENIED` | Access denied |
/// | `TIMEOUT` | Operation timed out |
/// | `TRANSPORT` | The tool server could not be reached |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "PERMISSION_DENIED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", format!("Unknown tool: {}", name.into()))
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(
            "PERMISSION_DENIED",
            format!("Permission denied: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            "TIMEOUT",
            format!("Operation timed out: {}", operation.into()),
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new("TRANSPORT", message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Outcome reported in a [`ToolResultEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Read-only operation succeeded
    Ok,
    /// A file was created or fully overwritten
    Created,
    /// An existing file was modified in place
    Edited,
    /// The text to replace was not present; nothing was written
    NotFound,
    /// The tool could not run; see `error` in the detail
    Error,
}

impl ToolOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolOutcome::Ok => "ok",
            ToolOutcome::Created => "created",
            ToolOutcome::Edited => "edited",
            ToolOutcome::NotFound => "not_found",
            ToolOutcome::Error => "error",
        }
    }
}

impl std::fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one tool invocation, as fed back to the model.
///
/// Serializes flat: `{"tool": .., "path": .., "outcome": .., <detail..>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultEnvelope {
    /// Name of the tool that produced this envelope
    #[serde(rename = "tool")]
    pub tool_name: String,
    /// Absolute path or other target the tool acted on
    #[serde(rename = "path")]
    pub path_or_target: String,
    pub outcome: ToolOutcome,
    /// Tool-specific payload (file content, listing, error message)
    #[serde(flatten)]
    pub detail: Map<String, Value>,
}

impl ToolResultEnvelope {
    pub fn new(
        tool_name: impl Into<String>,
        path_or_target: impl Into<String>,
        outcome: ToolOutcome,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            path_or_target: path_or_target.into(),
            outcome,
            detail: Map::new(),
        }
    }

    pub fn ok(tool_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(tool_name, target, ToolOutcome::Ok)
    }

    pub fn created(tool_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(tool_name, target, ToolOutcome::Created)
    }

    pub fn edited(tool_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(tool_name, target, ToolOutcome::Edited)
    }

    pub fn not_found(tool_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(tool_name, target, ToolOutcome::NotFound)
    }

    /// Error envelope carrying the error code and a readable message.
    pub fn error(
        tool_name: impl Into<String>,
        target: impl Into<String>,
        error: &ToolError,
    ) -> Self {
        let mut envelope = Self::new(tool_name, target, ToolOutcome::Error)
            .with_detail("error", error.message.clone())
            .with_detail("code", error.code.clone());
        if let Some(details) = &error.details {
            envelope = envelope.with_detail("details", details.clone());
        }
        envelope
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.outcome == ToolOutcome::Error
    }

    /// Error message, for error envelopes
    pub fn error_message(&self) -> Option<&str> {
        self.detail.get("error").and_then(|v| v.as_str())
    }

    /// Compact single-line JSON rendering
    pub fn to_json(&self) -> String {
        // Map keys are strings and values are JSON already.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"tool":{:?},"outcome":"error","error":"unserializable result"}}"#,
                self.tool_name
            )
        })
    }
}
