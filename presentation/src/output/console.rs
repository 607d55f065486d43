//! Console formatting for session output

use colored::Colorize;
use quill_domain::{RejectedCandidate, ToolCall, ToolDefinition, ToolOutcome, ToolResultEnvelope};

/// Longest argument rendering shown on a tool-call line
const MAX_ARGS_WIDTH: usize = 120;

/// Formats session events for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Label printed before each user prompt
    pub fn user_prompt() -> String {
        format!("{} ", "You:".green().bold())
    }

    /// Final answer of a turn
    pub fn format_answer(answer: &str) -> String {
        format!("{} {}", "Assistant:".cyan().bold(), answer.trim())
    }

    /// One line announcing a dispatched tool call
    pub fn format_tool_call(call: &ToolCall) -> String {
        let args = truncate(&call.arguments_json(), MAX_ARGS_WIDTH);
        format!("  {} {}({})", "->".yellow(), call.tool_name.bold(), args.dimmed())
    }

    /// One line summarizing an envelope
    pub fn format_tool_result(envelope: &ToolResultEnvelope) -> String {
        let outcome = match envelope.outcome {
            ToolOutcome::Ok | ToolOutcome::Created | ToolOutcome::Edited => {
                envelope.outcome.as_str().green()
            }
            ToolOutcome::NotFound => envelope.outcome.as_str().yellow(),
            ToolOutcome::Error => envelope.outcome.as_str().red(),
        };

        let mut line = format!("  {} {} {}", "<-".yellow(), outcome, envelope.path_or_target);
        let message = envelope
            .error_message()
            .or_else(|| envelope.detail.get("message").and_then(|v| v.as_str()));
        if let Some(message) = message {
            line.push_str(&format!(": {}", message));
        }
        line
    }

    /// Candidates the parser rejected
    pub fn format_rejected(rejected: &[RejectedCandidate]) -> String {
        rejected
            .iter()
            .map(|r| format!("  {} {} ({})", "!".red(), r.text, r.reason))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    /// The `/tools` listing
    pub fn format_tools(definitions: &[ToolDefinition]) -> String {
        let mut output = format!("{}\n", "Tools:".cyan().bold());
        for tool in definitions {
            output.push_str(&format!("  {}\n", tool.signature().bold()));
            output.push_str(&Self::indent(&tool.description, "      "));
            output.push('\n');
        }
        output
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{}...", head)
}
