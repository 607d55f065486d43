//! Tool domain traits
//!
//! Contains pure domain logic traits for tool validation.
//! The async ToolExecutorPort is defined in the application layer (ports).

use super::entities::{ToolCall, ToolDefinition};
use super::value_objects::ToolError;
use serde_json::Value;
use std::collections::HashSet;

/// Validator for tool calls
///
/// This is a pure domain trait that checks tool calls against their
/// definitions and fills declared defaults, without any I/O.
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolError>;

    /// Validate, then return a copy of the call with every omitted optional
    /// parameter set to its declared default.
    fn prepare(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<ToolCall, ToolError> {
        self.validate(call, definition)?;
        let mut prepared = call.clone();
        for param in &definition.parameters {
            if prepared.arguments.contains_key(&param.name) {
                continue;
            }
            if let Some(default) = &param.default {
                prepared.arguments.insert(param.name.clone(), default.clone());
            }
        }
        Ok(prepared)
    }
}

/// Default implementation of ToolValidator
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolError> {
        for param in &definition.parameters {
            match call.arguments.get(&param.name) {
                None if param.required => {
                    return Err(ToolError::invalid_argument(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    )));
                }
                Some(value) if !matches_type(value, &param.param_type) => {
                    return Err(ToolError::invalid_argument(format!(
                        "Parameter '{}' for tool '{}' must be a {}",
                        param.name, definition.name, param.param_type
                    )));
                }
                _ => {}
            }
        }

        let valid_params: HashSet<&str> =
            definition.parameters.iter().map(|p| p.name.as_str()).collect();

        for arg_name in call.arguments.keys() {
            if !valid_params.contains(arg_name.as_str()) {
                return Err(ToolError::invalid_argument(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                )));
            }
        }

        Ok(())
    }
}

/// Loose JSON-schema style type check. Unknown type hints accept anything.
fn matches_type(value: &Value, param_type: &str) -> bool {
    match param_type {
        "string" | "path" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolParameter;

    fn edit_file() -> ToolDefinition {
        ToolDefinition::new("edit_file", "Edit a file")
            .with_parameter(ToolParameter::new("path", "File to edit", true))
            .with_parameter(ToolParameter::new("old_str", "Old text", false).with_default(""))
            .with_parameter(ToolParameter::new("new_str", "New text", false).with_default(""))
    }

    #[test]
    fn test_validator_missing_required() {
        let validator = DefaultToolValidator;
        let definition = ToolDefinition::new("test", "test tool")
            .with_parameter(ToolParameter::new("required_param", "A required param", true));

        let call = ToolCall::new("test");
        let err = validator.validate(&call, &definition).unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
        assert!(err.message.contains("Missing required parameter"));
    }

    #[test]
    fn test_validator_unknown_param() {
        let validator = DefaultToolValidator;
        let definition = ToolDefinition::new("test", "test tool")
            .with_parameter(ToolParameter::new("known_param", "A known param", false));

        let call = ToolCall::new("test").with_arg("unknown_param", "value");
        let err = validator.validate(&call, &definition).unwrap_err();
        assert!(err.message.contains("Unknown parameter"));
    }

    #[test]
    fn test_validator_wrong_type() {
        let validator = DefaultToolValidator;
        let call = ToolCall::new("edit_file").with_arg("path", 42);
        let err = validator.validate(&call, &edit_file()).unwrap_err();
        assert!(err.message.contains("must be a string"));
    }

    #[test]
    fn test_prepare_fills_defaults() {
        let validator = DefaultToolValidator;
        let call = ToolCall::new("edit_file")
            .with_arg("path", "out.txt")
            .with_arg("new_str", "hello");

        let prepared = validator.prepare(&call, &edit_file()).unwrap();
        assert_eq!(prepared.get_string("old_str"), Some(""));
        assert_eq!(prepared.get_string("new_str"), Some("hello"));
        assert_eq!(prepared.get_string("path"), Some("out.txt"));
    }

    #[test]
    fn test_prepare_rejects_before_filling() {
        let validator = DefaultToolValidator;
        let call = ToolCall::new("edit_file").with_arg("new_str", "hello");
        assert!(validator.prepare(&call, &edit_file()).is_err());
    }
}
