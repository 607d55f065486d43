//! Transport mode value object

use crate::grammar::GrammarKind;
use serde::{Deserialize, Serialize};

/// Where the tools live and, with it, which call grammar the model uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Tools run in-process; the model writes `tool: NAME({json})` lines
    #[default]
    Line,
    /// Tools run in a child MCP server; the model replies with one JSON object
    Mcp,
}

impl TransportMode {
    pub fn grammar(&self) -> GrammarKind {
        match self {
            TransportMode::Line => GrammarKind::Line,
            TransportMode::Mcp => GrammarKind::WholeMessage,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Line => "line",
            TransportMode::Mcp => "mcp",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_line() {
        assert_eq!(TransportMode::default(), TransportMode::Line);
    }

    #[test]
    fn test_grammar_follows_transport() {
        assert_eq!(TransportMode::Line.grammar(), GrammarKind::Line);
        assert_eq!(TransportMode::Mcp.grammar(), GrammarKind::WholeMessage);
    }

    #[test]
    fn test_deserialize_lowercase() {
        let mode: TransportMode = serde_json::from_str("\"mcp\"").unwrap();
        assert_eq!(mode, TransportMode::Mcp);
    }
}
