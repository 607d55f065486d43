//! What to do with malformed call candidates.

use super::RejectedCandidate;
use serde::{Deserialize, Serialize};

/// Prefix of the note sent back to the model under [`MalformedCallPolicy::Report`]
pub const MALFORMED_NOTE_PREFIX: &str = "tool_error:";

/// Handling of candidates that carry the call marker but fail to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedCallPolicy {
    /// Ignore them as if they were prose
    #[default]
    Drop,
    /// Tell the model which candidates were ignored and why
    Report,
}

impl MalformedCallPolicy {
    /// The note to append to the conversation, if any.
    pub fn feedback(&self, rejected: &[RejectedCandidate]) -> Option<String> {
        if *self == MalformedCallPolicy::Drop || rejected.is_empty() {
            return None;
        }

        let mut note = format!(
            "{} {} malformed tool call(s) ignored:",
            MALFORMED_NOTE_PREFIX,
            rejected.len()
        );
        for candidate in rejected {
            if candidate.line > 0 {
                note.push_str(&format!(
                    "\n- line {}: {} ({})",
                    candidate.line, candidate.text, candidate.reason
                ));
            } else {
                note.push_str(&format!("\n- {} ({})", candidate.text, candidate.reason));
            }
        }
        Some(note)
    }
}
