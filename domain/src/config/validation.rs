//! Configuration validation issues.
//!
//! Loaders report problems as a list of [`ConfigIssue`]s instead of failing
//! on the first one, so the user sees everything wrong with a config file at
//! once. Any [`Severity::Error`] issue stops startup.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `transport = "mcp"` with an empty server command.
    MissingMcpCommand,
    /// `max_iterations = 0` would stop every turn before its first inference.
    ZeroMaxIterations,
    /// A zero timeout would fail every tool server request.
    ZeroTimeout,
    /// No model name configured for the selected backend.
    EmptyModel,
    /// Sampling temperature outside the range backends accept.
    TemperatureOutOfRange,
    /// Concurrent execution with the whole-message grammar has nothing to overlap.
    ConcurrentSingleCall,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
