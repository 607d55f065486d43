//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Invalid tool definition: {0}")]
    InvalidToolDefinition(String),

    #[error("Tool loop exceeded {0} iterations without a final answer")]
    IterationLimitExceeded(usize),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        let error = DomainError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::DuplicateTool("read_file".to_string()).is_cancelled());
        assert!(!DomainError::IterationLimitExceeded(3).is_cancelled());
    }

    #[test]
    fn test_iteration_limit_message_names_limit() {
        let error = DomainError::IterationLimitExceeded(8);
        assert!(error.to_string().contains('8'));
    }
}
