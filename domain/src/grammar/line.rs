//! Line grammar: `tool: NAME({json})`
//!
//! A line is a call only if, once trimmed, it starts with the marker, then a
//! tool name, `(`, a single-line JSON object and a closing `)` with nothing
//! after it. Any other line is prose.

use super::{InvocationParser, ParseOutcome, RejectedCandidate};
use crate::tool::entities::ToolCall;
use serde_json::Value;

/// Marker token that opens a call line
pub const DEFAULT_MARKER: &str = "tool:";

/// Scans a completion line by line for marker-prefixed calls.
#[derive(Debug, Clone)]
pub struct LineGrammar {
    marker: String,
}

impl Default for LineGrammar {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl LineGrammar {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Parse one line.
    ///
    /// `None` means the line is prose. `Some(Err(reason))` means the marker
    /// was present but the rest of the line is malformed.
    pub fn parse_line(&self, line: &str) -> Option<Result<ToolCall, String>> {
        let rest = line.trim().strip_prefix(self.marker.as_str())?;
        Some(parse_invocation(rest.trim()))
    }
}

fn parse_invocation(rest: &str) -> Result<ToolCall, String> {
    let (name, args_part) = rest
        .split_once('(')
        .ok_or_else(|| "expected '(' after tool name".to_string())?;

    let name = name.trim();
    if name.is_empty() {
        return Err("missing tool name".to_string());
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("invalid tool name '{}'", name));
    }

    let json = args_part
        .strip_suffix(')')
        .ok_or_else(|| "expected ')' at end of line".to_string())?;

    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(arguments)) => Ok(ToolCall::new(name).with_arguments(arguments)),
        Ok(_) => Err("arguments must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON arguments: {}", e)),
    }
}

impl InvocationParser for LineGrammar {
    fn parse_detailed(&self, raw: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        for (index, line) in raw.lines().enumerate() {
            match self.parse_line(line) {
                None => {}
                Some(Ok(call)) => outcome.calls.push(call),
                Some(Err(reason)) => outcome.rejected.push(RejectedCandidate {
                    line: index + 1,
                    text: line.trim().to_string(),
                    reason,
                }),
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> Vec<ToolCall> {
        LineGrammar::default().parse(raw)
    }

    #[test]
    fn test_prose_yields_no_calls() {
        let raw = "The file contains two names.\nI replaced the first one.\n";
        assert!(parse(raw).is_empty());
        assert!(LineGrammar::default().parse_detailed(raw).rejected.is_empty());
    }

    #[test]
    fn test_single_call() {
        let calls = parse(r#"tool: read_file({"filename": "notes.txt"})"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "read_file");
        assert_eq!(calls[0].get_string("filename"), Some("notes.txt"));
    }

    #[test]
    fn test_extracts_well_formed_calls_in_order() {
        let raw = r#"Let me look around first.
tool: list_files({"path": "."})
tool: read_file({"filename": "a.txt"}
Some reasoning in between.
   tool: read_file({"filename": "b.txt"})
tool: edit_file(not json)
tool: edit_file({"path": "c.txt", "old_str": "", "new_str": "x"})"#;

        let outcome = LineGrammar::default().parse_detailed(raw);
        let names: Vec<&str> = outcome.calls.iter().map(|c| c.tool_name.as_str()).collect();
        assert_eq!(names, vec!["list_files", "read_file", "edit_file"]);
        assert_eq!(outcome.calls[1].get_string("filename"), Some("b.txt"));

        let rejected_lines: Vec<usize> = outcome.rejected.iter().map(|r| r.line).collect();
        assert_eq!(rejected_lines, vec![3, 6]);
    }

    #[test]
    fn test_marker_must_start_the_line() {
        let raw = r#"You could call tool: read_file({"filename": "x"}) yourself."#;
        let outcome = LineGrammar::default().parse_detailed(raw);
        assert!(outcome.calls.is_empty());
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_trailing_text_after_paren_is_rejected() {
        let outcome = LineGrammar::default()
            .parse_detailed(r#"tool: read_file({"filename": "x"}) please"#);
        assert!(outcome.calls.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn test_non_object_arguments_are_rejected() {
        let outcome = LineGrammar::default().parse_detailed(r#"tool: read_file(["x"])"#);
        assert!(outcome.calls.is_empty());
        assert!(outcome.rejected[0].reason.contains("JSON object"));
    }

    #[test]
    fn test_empty_object_and_name_spacing() {
        let calls = parse("tool:list_files ({})");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "list_files");
        assert!(calls[0].arguments.is_empty());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let outcome = LineGrammar::default().parse_detailed("tool: ({})");
        assert!(outcome.calls.is_empty());
        assert_eq!(outcome.rejected[0].reason, "missing tool name");
    }

    #[test]
    fn test_nested_parentheses_in_arguments() {
        let calls = parse(r#"tool: edit_file({"path": "f.rs", "old_str": "f(x)", "new_str": "g(x)"})"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get_string("old_str"), Some("f(x)"));
        assert_eq!(calls[0].arguments_value()["new_str"], json!("g(x)"));
    }

    #[test]
    fn test_custom_marker() {
        let grammar = LineGrammar::new("call>");
        assert_eq!(grammar.marker(), "call>");
        assert_eq!(grammar.parse(r#"call> list_files({})"#).len(), 1);
        assert!(grammar.parse(r#"tool: list_files({})"#).is_empty());
    }
}
