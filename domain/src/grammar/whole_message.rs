//! Whole-message grammar: `{"tool": NAME, "args": {..}}`
//!
//! The completion is a call only when the trimmed text is a single JSON
//! object carrying the call key. Anything else is a final answer; nothing is
//! ever extracted from the middle of a reply.

use super::{InvocationParser, ParseOutcome, RejectedCandidate};
use crate::tool::entities::ToolCall;
use serde_json::{Map, Value};

pub const DEFAULT_CALL_KEY: &str = "tool";
pub const DEFAULT_ARGS_KEY: &str = "args";

/// Treats the entire completion as either one call or an answer.
#[derive(Debug, Clone)]
pub struct WholeMessageGrammar {
    call_key: String,
    args_key: String,
}

impl Default for WholeMessageGrammar {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_KEY, DEFAULT_ARGS_KEY)
    }
}

impl WholeMessageGrammar {
    pub fn new(call_key: impl Into<String>, args_key: impl Into<String>) -> Self {
        Self {
            call_key: call_key.into(),
            args_key: args_key.into(),
        }
    }

    pub fn call_key(&self) -> &str {
        &self.call_key
    }

    pub fn args_key(&self) -> &str {
        &self.args_key
    }

    fn rejected(text: &str, reason: impl Into<String>) -> ParseOutcome {
        ParseOutcome {
            calls: Vec::new(),
            rejected: vec![RejectedCandidate {
                line: 0,
                text: text.to_string(),
                reason: reason.into(),
            }],
        }
    }
}

impl InvocationParser for WholeMessageGrammar {
    fn parse_detailed(&self, raw: &str) -> ParseOutcome {
        let text = raw.trim();
        if !(text.starts_with('{') && text.ends_with('}')) {
            return ParseOutcome::default();
        }

        let object = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return ParseOutcome::default(),
            Err(e) => return Self::rejected(text, format!("invalid JSON: {}", e)),
        };

        // A JSON answer without the call key is just an answer.
        let Some(name) = object.get(&self.call_key) else {
            return ParseOutcome::default();
        };
        let Some(name) = name.as_str().map(str::trim).filter(|n| !n.is_empty()) else {
            return Self::rejected(
                text,
                format!("'{}' must be a non-empty string", self.call_key),
            );
        };

        let arguments = match object.get(&self.args_key) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(args)) => args.clone(),
            Some(_) => {
                return Self::rejected(text, format!("'{}' must be a JSON object", self.args_key));
            }
        };

        ParseOutcome {
            calls: vec![ToolCall::new(name).with_arguments(arguments)],
            rejected: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> WholeMessageGrammar {
        WholeMessageGrammar::default()
    }

    #[test]
    fn test_whole_message_call() {
        let calls = grammar().parse(r#"  {"tool": "list_files", "args": {"path": "."}}  "#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "list_files");
        assert_eq!(calls[0].get_string("path"), Some("."));
    }

    #[test]
    fn test_missing_args_defaults_to_empty() {
        let calls = grammar().parse(r#"{"tool": "list_files"}"#);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].arguments.is_empty());
    }

    #[test]
    fn test_valid_json_without_call_key_is_an_answer() {
        let outcome = grammar().parse_detailed(r#"{"answer": "there are 3 files"}"#);
        assert!(outcome.is_answer());
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_answer() {
        let outcome = grammar().parse_detailed(r#"{tool: list_files, args: {}}"#);
        assert!(outcome.is_answer());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].line, 0);
    }

    #[test]
    fn test_prose_around_json_is_an_answer() {
        let raw = r#"Sure! {"tool": "list_files", "args": {}}"#;
        assert!(grammar().parse(raw).is_empty());

        let raw = "{\"tool\": \"list_files\"}\nThat should do it.";
        assert!(grammar().parse(raw).is_empty());
    }

    #[test]
    fn test_non_string_tool_is_rejected() {
        let outcome = grammar().parse_detailed(r#"{"tool": 7, "args": {}}"#);
        assert!(outcome.is_answer());
        assert!(outcome.rejected[0].reason.contains("non-empty string"));
    }

    #[test]
    fn test_non_object_args_is_rejected() {
        let outcome = grammar().parse_detailed(r#"{"tool": "read_file", "args": "notes.txt"}"#);
        assert!(outcome.is_answer());
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn test_null_args_is_empty() {
        let calls = grammar().parse(r#"{"tool": "list_files", "args": null}"#);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].arguments.is_empty());
    }
}
