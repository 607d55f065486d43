//! Tool Registry
//!
//! The [`ToolRegistry`] maps tool names to their definition and handler.
//! It is filled once at startup and then shared read-only behind an `Arc`
//! for the rest of the session; nothing registers tools mid-conversation.
//!
//! # Usage
//!
//! ```ignore
//! use quill_infrastructure::tools::{ToolRegistry, file};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(file::read_file_definition(), file::ReadFile::new(resolver))?;
//!
//! let handler = registry.resolve("read_file")?;
//! let catalog = registry.describe_all();
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use quill_domain::{DomainError, ToolDefinition, ToolError, ToolSpec};
use tracing::debug;

use super::handler::ToolHandler;

/// Name → (definition, handler) table, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    spec: ToolSpec,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique; a second registration under the
    /// same name fails and leaves the first in place.
    pub fn register(
        &mut self,
        descriptor: ToolDefinition,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), DomainError> {
        let name = descriptor.name.clone();
        self.spec.try_register(descriptor)?;
        debug!(tool = %name, "Registered tool");
        self.handlers.insert(name, Arc::new(handler));
        Ok(())
    }

    /// Handler registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ToolHandler>, ToolError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::unknown_tool(name))
    }

    /// Every descriptor, in registration order.
    pub fn describe_all(&self) -> &[ToolDefinition] {
        self.spec.definitions()
    }

    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.spec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spec.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.spec.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_domain::{ToolCall, ToolResultEnvelope};

    fn echo(call: &ToolCall) -> Result<ToolResultEnvelope, ToolError> {
        Ok(ToolResultEnvelope::ok(&call.tool_name, "-").with_detail("args", call.arguments_value()))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new("echo", "Echo arguments"), echo)
            .unwrap();

        let handler = registry.resolve("echo").unwrap();
        let envelope = handler
            .call(&ToolCall::new("echo").with_arg("x", 1))
            .unwrap();
        assert_eq!(envelope.detail["args"]["x"], 1);
    }

    #[test]
    fn test_resolve_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.resolve("missing").err().unwrap();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "Unknown tool: missing");
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new("echo", "first"), echo)
            .unwrap();
        let result = registry.register(ToolDefinition::new("echo", "second"), echo);

        assert_eq!(result, Err(DomainError::DuplicateTool("echo".to_string())));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.describe_all()[0].description, "first");
    }

    #[test]
    fn test_describe_all_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(ToolDefinition::new(name, name), echo)
                .unwrap();
        }
        let names: Vec<_> = registry.describe_all().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
