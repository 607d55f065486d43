//! Tool server configuration from TOML (`[mcp]` section)

use quill_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw tool server configuration
///
/// ```toml
/// [mcp]
/// command = ["python", "simple_mcp.py"]   # omit to run `quill serve-tools`
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMcpConfig {
    /// Program and arguments of the tool server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Per-request timeout, handshake included
    pub timeout_secs: u64,
}

impl Default for FileMcpConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: 30,
        }
    }
}

impl FileMcpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Server command, falling back to `fallback` when none is configured.
    pub fn command_or(&self, fallback: impl FnOnce() -> Vec<String>) -> Vec<String> {
        self.command.clone().unwrap_or_else(fallback)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(command) = &self.command
            && command.first().is_none_or(|program| program.trim().is_empty())
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingMcpCommand,
                "mcp.command must name a program; omit it to use the built-in tool server",
            ));
        }

        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "mcp.timeout_secs cannot be 0",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_fallback() {
        let config = FileMcpConfig::default();
        assert_eq!(
            config.command_or(|| vec!["quill".into(), "serve-tools".into()]),
            vec!["quill", "serve-tools"]
        );

        let config: FileMcpConfig =
            toml::from_str(r#"command = ["python", "simple_mcp.py"]"#).unwrap();
        assert_eq!(config.command_or(Vec::new), vec!["python", "simple_mcp.py"]);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate() {
        assert!(FileMcpConfig::default().validate().is_empty());

        let empty = FileMcpConfig {
            command: Some(vec![]),
            timeout_secs: 0,
        };
        let codes: Vec<_> = empty.validate().iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![ConfigIssueCode::MissingMcpCommand, ConfigIssueCode::ZeroTimeout]
        );
    }
}
