//! Loop states and batch execution mode

use serde::{Deserialize, Serialize};

/// State of the orchestration loop.
///
/// ```text
/// AwaitingUserInput ──▶ Inferring ──▶ Deciding ──┬──▶ Answering ──▶ AwaitingUserInput
///                          ▲                     │
///                          └────── Invoking ◀────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    AwaitingUserInput,
    Inferring,
    Deciding,
    Answering,
    Invoking,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::AwaitingUserInput => "awaiting_user_input",
            LoopState::Inferring => "inferring",
            LoopState::Deciding => "deciding",
            LoopState::Answering => "answering",
            LoopState::Invoking => "invoking",
        }
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: LoopState) -> bool {
        use LoopState::*;
        matches!(
            (self, next),
            (AwaitingUserInput, Inferring)
                | (Inferring, Deciding)
                | (Inferring, AwaitingUserInput)
                | (Deciding, Answering)
                | (Deciding, Invoking)
                | (Answering, AwaitingUserInput)
                | (Invoking, Inferring)
                | (Invoking, AwaitingUserInput)
        )
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the calls parsed from one completion are executed.
///
/// Results are appended in parse order either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One call at a time, in parse order
    #[default]
    Sequential,
    /// All calls of a batch at once
    Concurrent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use LoopState::*;
        let path = [AwaitingUserInput, Inferring, Deciding, Invoking, Inferring, Deciding, Answering, AwaitingUserInput];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_illegal_transitions() {
        use LoopState::*;
        assert!(!AwaitingUserInput.can_transition_to(Invoking));
        assert!(!Answering.can_transition_to(Inferring));
        assert!(!Deciding.can_transition_to(Inferring));
    }

    #[test]
    fn test_execution_mode_default_is_sequential() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Sequential);
        let mode: ExecutionMode = serde_json::from_str("\"concurrent\"").unwrap();
        assert_eq!(mode, ExecutionMode::Concurrent);
    }
}
