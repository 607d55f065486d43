//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod mcp;
mod providers;

pub use agent::FileAgentConfig;
pub use mcp::FileMcpConfig;
pub use providers::{
    FileAnthropicConfig, FileBackendConfig, FileOllamaConfig, FileProvidersConfig,
};

use quill_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured logging settings (`[logging]` section)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Path of the JSONL conversation trace. Disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_log: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Loop and transport settings
    pub agent: FileAgentConfig,
    /// Backend selection
    pub backend: FileBackendConfig,
    /// Per-backend settings
    pub providers: FileProvidersConfig,
    /// Tool server settings (transport = "mcp")
    pub mcp: FileMcpConfig,
    /// Conversation trace settings
    pub logging: FileLoggingConfig,
}

/// Configuration could not be loaded or cannot work.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue.message))
        .collect::<Vec<_>>()
        .join("\n")
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.agent.validate();
        issues.extend(self.providers.validate(self.backend.provider));
        if self.agent.transport == quill_domain::TransportMode::Mcp {
            issues.extend(self.mcp.validate());
        }
        issues
    }

    /// Fail on error-severity issues; hand back the warnings.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderKind;
    use quill_domain::{ConfigIssueCode, TransportMode};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[agent]
transport = "mcp"
max_iterations = 6

[backend]
provider = "ollama"

[providers.ollama]
model = "llama3.2"

[mcp]
command = ["quill", "serve-tools"]
timeout_secs = 10

[logging]
conversation_log = "trace.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.transport, TransportMode::Mcp);
        assert_eq!(config.backend.provider, ProviderKind::Ollama);
        assert_eq!(config.providers.ollama.model, "llama3.2");
        assert_eq!(config.mcp.timeout_secs, 10);
        assert_eq!(config.logging.conversation_log.as_deref(), Some("trace.jsonl"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[providers.anthropic]\nmax_tokens = 2048\n").unwrap();
        assert_eq!(config.providers.anthropic.max_tokens, 2048);
        // Defaults should apply
        assert_eq!(config.providers.anthropic.model, "claude-3-5-sonnet-20240620");
        assert_eq!(config.agent.transport, TransportMode::Line);
        assert!(config.logging.conversation_log.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert!(config.check().unwrap().is_empty());
    }

    #[test]
    fn test_mcp_section_checked_only_for_mcp_transport() {
        let mut config = FileConfig::default();
        config.mcp.timeout_secs = 0;
        assert!(config.validate().is_empty());

        config.agent.transport = TransportMode::Mcp;
        let err = config.check().unwrap_err();
        match err {
            ConfigError::Invalid(issues) => {
                assert_eq!(issues[0].code, ConfigIssueCode::ZeroTimeout);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
