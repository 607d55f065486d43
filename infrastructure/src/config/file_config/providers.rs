//! Backend configuration from TOML (`[backend]` and `[providers]` sections)

use crate::providers::ProviderKind;
use quill_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Which inference backend a session talks to.
///
/// ```toml
/// [backend]
/// provider = "ollama"      # "anthropic" or "ollama"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    pub provider: ProviderKind,
}

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended; prefer the env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// JSON file holding `{"ANTHROPIC_AUTH_TOKEN": "..."}`, relative to the
    /// working directory.
    pub credentials_file: String,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    pub model: String,
    /// Max tokens per response.
    pub max_tokens: u32,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            credentials_file: "env.json".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20240620".to_string(),
            max_tokens: 1024,
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// Ollama provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    /// Server address; a bare `host:port` gets `http://` prepended.
    pub host: String,
    pub model: String,
    /// Sampling temperature passed as `options.temperature`.
    pub temperature: f32,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:11434".to_string(),
            model: "qwen3:4b".to_string(),
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Anthropic API settings.
    pub anthropic: FileAnthropicConfig,
    /// Ollama settings.
    pub ollama: FileOllamaConfig,
}

impl FileProvidersConfig {
    /// Check the settings of the selected provider only.
    pub fn validate(&self, selected: ProviderKind) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        match selected {
            ProviderKind::Anthropic => {
                if self.anthropic.model.trim().is_empty() {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::EmptyModel,
                        "providers.anthropic.model cannot be empty",
                    ));
                }
            }
            ProviderKind::Ollama => {
                if self.ollama.model.trim().is_empty() {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::EmptyModel,
                        "providers.ollama.model cannot be empty",
                    ));
                }
                if !(0.0..=2.0).contains(&self.ollama.temperature) {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::TemperatureOutOfRange,
                        format!(
                            "providers.ollama.temperature: {} is outside 0.0..=2.0",
                            self.ollama.temperature
                        ),
                    ));
                }
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileProvidersConfig::default();
        assert_eq!(config.anthropic.model, "claude-3-5-sonnet-20240620");
        assert_eq!(config.anthropic.max_tokens, 1024);
        assert_eq!(config.anthropic.credentials_file, "env.json");
        assert_eq!(config.ollama.model, "qwen3:4b");
        assert!((config.ollama.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate_only_selected_provider() {
        let mut config = FileProvidersConfig::default();
        config.ollama.model = String::new();

        assert!(config.validate(ProviderKind::Anthropic).is_empty());
        let issues = config.validate(ProviderKind::Ollama);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::EmptyModel);
    }

    #[test]
    fn test_temperature_out_of_range_is_a_warning() {
        let mut config = FileProvidersConfig::default();
        config.ollama.temperature = 3.5;
        let issues = config.validate(ProviderKind::Ollama);
        assert_eq!(issues[0].code, ConfigIssueCode::TemperatureOutOfRange);
        assert!(!issues[0].is_error());
    }
}
