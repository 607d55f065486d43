//! Instruction text rendered from the tool catalog

use crate::grammar::GrammarKind;
use crate::grammar::line::DEFAULT_MARKER;
use crate::grammar::whole_message::{DEFAULT_ARGS_KEY, DEFAULT_CALL_KEY};
use crate::tool::entities::ToolDefinition;
use crate::tool::value_objects::ToolResultEnvelope;

/// Prefix of every tool result turn fed back to the model
pub const RESULT_PREFIX: &str = "tool_result:";

/// Builds the leading instruction block for a session.
///
/// Everything here is a pure function of the catalog and the grammar, so a
/// session renders its instructions once and reuses them for every inference
/// call.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Full instruction block: role, catalog, call grammar and result format.
    pub fn assemble(tools: &[ToolDefinition], grammar: GrammarKind) -> String {
        let mut prompt = String::from(
            "You are a coding assistant with access to tools that act on the local filesystem.\n\
             Answer directly when you can. When you need information or want to change a file, \
             request a tool instead of guessing.\n\n",
        );

        prompt.push_str("Available tools:\n\n");
        prompt.push_str(&Self::render_catalog(tools));
        prompt.push('\n');
        prompt.push_str(&Self::grammar_rules(grammar));
        prompt.push('\n');
        prompt.push_str(&Self::result_rules());
        prompt
    }

    /// Textual catalog: one block per tool with its parameter contract.
    pub fn render_catalog(tools: &[ToolDefinition]) -> String {
        if tools.is_empty() {
            return "(no tools available)\n".to_string();
        }

        let mut catalog = String::new();
        for tool in tools {
            catalog.push_str(&format!("TOOL {}\n", tool.name));
            catalog.push_str(&format!("Description: {}\n", tool.description));
            catalog.push_str(&format!("Signature: {}\n", tool.signature()));
            for param in &tool.parameters {
                let requirement = match (&param.default, param.required) {
                    (_, true) => "required".to_string(),
                    (Some(default), false) => format!("optional, default {}", default),
                    (None, false) => "optional".to_string(),
                };
                catalog.push_str(&format!(
                    "  - {} ({}, {}): {}\n",
                    param.name, param.param_type, requirement, param.description
                ));
            }
            catalog.push('\n');
        }
        catalog
    }

    /// Exact output grammar for requesting a call.
    pub fn grammar_rules(grammar: GrammarKind) -> String {
        match grammar {
            GrammarKind::Line => format!(
                "=== Tool call format ===\n\
                 To call a tool, reply with a line of exactly this form:\n\n\
                 {marker} TOOL_NAME({{JSON_ARGS}})\n\n\
                 - The line starts with `{marker}` and ends with the closing parenthesis.\n\
                 - JSON_ARGS is a compact single-line JSON object using double quotes.\n\
                 - Put each call on its own line. Several calls in one reply run in order.\n\
                 - Never start a line with `{marker}` unless it is a call.\n",
                marker = DEFAULT_MARKER
            ),
            GrammarKind::WholeMessage => format!(
                "=== Tool call format ===\n\
                 To call a tool, your entire reply must be one JSON object and nothing else:\n\n\
                 {{\"{call}\": \"<tool_name>\", \"{args}\": {{ ... }}}}\n\n\
                 - \"{call}\" must be one of the tool names above.\n\
                 - \"{args}\" must match that tool's parameters.\n\
                 - When no tool is needed, answer in plain natural language.\n",
                call = DEFAULT_CALL_KEY,
                args = DEFAULT_ARGS_KEY
            ),
        }
    }

    /// How tool results come back.
    pub fn result_rules() -> String {
        format!(
            "=== Tool result format ===\n\
             Each result arrives as a user message of the form:\n\n\
             {prefix} {{\"tool\": ..., \"path\": ..., \"outcome\": ..., ...}}\n\n\
             outcome is one of ok, created, edited, not_found or error. \
             After reading a result, continue: call another tool or give your final answer.\n",
            prefix = RESULT_PREFIX
        )
    }

    /// Render an envelope as the content of a result turn.
    pub fn render_result(envelope: &ToolResultEnvelope) -> String {
        format!("{} {}", RESULT_PREFIX, envelope.to_json())
    }
}
