//! JSON Schema conversion for tool definitions.
//!
//! Tools cross the MCP boundary as `{name, description, inputSchema}`. The
//! server renders definitions this way and the client reads them back into
//! [`ToolDefinition`]s, so both directions live here.

use quill_domain::{ToolDefinition, ToolParameter, ToolSpec};
use serde_json::{Map, Value, json};

/// Converter between [`ToolDefinition`] and JSON Schema tool descriptors.
///
/// Handles param_type → JSON Schema type mapping:
/// - `"string"`, `"path"` → `"string"`
/// - `"number"`, `"integer"`, `"boolean"`, `"array"`, `"object"` → same
/// - anything else → `"string"`
pub struct JsonSchemaToolConverter;

impl JsonSchemaToolConverter {
    pub fn tool_to_schema(tool: &ToolDefinition) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let schema_type = match param.param_type.as_str() {
                "string" | "path" => "string",
                t @ ("number" | "integer" | "boolean" | "array" | "object") => t,
                _ => "string",
            };

            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(schema_type));
            prop.insert("description".to_string(), json!(param.description));
            if let Some(default) = &param.default {
                prop.insert("default".to_string(), default.clone());
            }
            properties.insert(param.name.clone(), Value::Object(prop));

            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "name": tool.name,
            "description": tool.description,
            "inputSchema": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }

    /// Descriptors in catalog order.
    pub fn all_tools_schema(spec: &ToolSpec) -> Vec<Value> {
        spec.all().map(Self::tool_to_schema).collect()
    }

    /// Read a definition back from `name`, `description` and an input schema.
    ///
    /// Properties keep the order the schema lists them in (serde_json is
    /// built with `preserve_order`). Returns `None` when the descriptor has
    /// no name.
    pub fn schema_to_tool(
        name: &str,
        description: &str,
        input_schema: &Value,
    ) -> Option<ToolDefinition> {
        if name.trim().is_empty() {
            return None;
        }

        let required: Vec<&str> = input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut definition = ToolDefinition::new(name, description);
        if let Some(properties) = input_schema.get("properties").and_then(Value::as_object) {
            for (param_name, prop) in properties {
                let mut param = ToolParameter::new(
                    param_name.clone(),
                    prop.get("description").and_then(Value::as_str).unwrap_or(""),
                    required.contains(&param_name.as_str()),
                )
                .with_type(prop.get("type").and_then(Value::as_str).unwrap_or("string"));
                if let Some(default) = prop.get("default") {
                    param = param.with_default(default.clone());
                }
                definition = definition.with_parameter(param);
            }
        }
        Some(definition)
    }
}
