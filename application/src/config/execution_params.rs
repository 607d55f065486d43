//! Execution parameters — orchestration loop control.
//!
//! [`ExecutionParams`] groups the static parameters that shape the loop in
//! [`RunTurnUseCase`](crate::use_cases::run_turn::RunTurnUseCase).

use quill_domain::{ExecutionMode, MalformedCallPolicy};
use serde::{Deserialize, Serialize};

/// Execution loop control parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum tool rounds (Invoking → Inferring cycles) per user turn.
    /// `None` leaves the loop unbounded.
    pub max_iterations: Option<usize>,
    /// How calls from one completion are executed.
    pub execution_mode: ExecutionMode,
    /// What to do with malformed call candidates.
    pub malformed_calls: MalformedCallPolicy,
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: Option<usize>) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    pub fn with_malformed_calls(mut self, policy: MalformedCallPolicy) -> Self {
        self.malformed_calls = policy;
        self
    }

    /// Whether `iteration` tool rounds exceed the guard.
    pub fn exceeds_limit(&self, iteration: usize) -> bool {
        self.max_iterations.is_some_and(|max| iteration > max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_iterations, None);
        assert_eq!(params.execution_mode, ExecutionMode::Sequential);
        assert_eq!(params.malformed_calls, MalformedCallPolicy::Drop);
        assert!(!params.exceeds_limit(10_000));
    }

    #[test]
    fn test_builder_and_limit() {
        let params = ExecutionParams::default()
            .with_max_iterations(Some(2))
            .with_execution_mode(ExecutionMode::Concurrent)
            .with_malformed_calls(MalformedCallPolicy::Report);

        assert!(!params.exceeds_limit(2));
        assert!(params.exceeds_limit(3));
        assert_eq!(params.execution_mode, ExecutionMode::Concurrent);
        assert_eq!(params.malformed_calls, MalformedCallPolicy::Report);
    }
}
