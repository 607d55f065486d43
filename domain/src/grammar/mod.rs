//! Invocation grammars
//!
//! An [`InvocationParser`] turns one raw model completion into zero or more
//! [`ToolCall`]s. The orchestration loop only ever sees this trait, so a
//! grammar can be swapped without touching the loop.
//!
//! | Grammar | Shape | Transport |
//! |---------|-------|-----------|
//! | [`LineGrammar`] | `tool: NAME({json})` on its own line, any number per reply | local |
//! | [`WholeMessageGrammar`] | the entire reply is `{"tool": NAME, "args": {..}}` | mcp |
//!
//! Both grammars are narrow on purpose: prose never parses as a call, and a
//! candidate that fails any check is reported in [`ParseOutcome::rejected`]
//! instead of being half-extracted. What happens to rejected candidates is
//! decided by [`MalformedCallPolicy`].

pub mod line;
pub mod policy;
pub mod whole_message;

pub use line::LineGrammar;
pub use policy::MalformedCallPolicy;
pub use whole_message::WholeMessageGrammar;

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// A candidate that looked like a call but failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCandidate {
    /// 1-based line number, or 0 when the whole message was the candidate
    pub line: usize,
    /// The offending text, trimmed
    pub text: String,
    /// Why it was rejected
    pub reason: String,
}

/// Everything a parser found in one completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Well-formed calls, in the order they appear
    pub calls: Vec<ToolCall>,
    pub rejected: Vec<RejectedCandidate>,
}

impl ParseOutcome {
    pub fn is_answer(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Extracts tool-call requests from raw model output.
pub trait InvocationParser: Send + Sync {
    /// Parse the completion, keeping rejected candidates.
    fn parse_detailed(&self, raw: &str) -> ParseOutcome;

    /// Parse the completion into its well-formed calls only.
    fn parse(&self, raw: &str) -> Vec<ToolCall> {
        self.parse_detailed(raw).calls
    }
}

/// Which grammar the model is instructed to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarKind {
    /// `tool: NAME({json})` lines
    #[default]
    Line,
    /// A single JSON object per reply
    WholeMessage,
}

impl GrammarKind {
    /// Build the parser for this grammar with its standard tokens.
    pub fn parser(&self) -> Box<dyn InvocationParser> {
        match self {
            GrammarKind::Line => Box::new(LineGrammar::default()),
            GrammarKind::WholeMessage => Box::new(WholeMessageGrammar::default()),
        }
    }
}
