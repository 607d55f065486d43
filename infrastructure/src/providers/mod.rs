//! Inference backend adapters
//!
//! Each adapter implements [`LlmGateway`] over one HTTP API. Which one a
//! session uses is decided once at startup from `[backend] provider`.

pub mod anthropic;
pub mod credentials;
mod http;
pub mod ollama;

pub use anthropic::AnthropicGateway;
pub use ollama::OllamaGateway;

use crate::config::FileProvidersConfig;
use quill_application::{GatewayError, LlmGateway};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build the gateway for `kind`. `base_dir` anchors the credentials file.
pub fn build_gateway(
    kind: ProviderKind,
    providers: &FileProvidersConfig,
    base_dir: &Path,
) -> Result<Arc<dyn LlmGateway>, GatewayError> {
    Ok(match kind {
        ProviderKind::Anthropic => {
            let api_key = credentials::resolve_anthropic_key(&providers.anthropic, base_dir)?;
            Arc::new(AnthropicGateway::new(&providers.anthropic, api_key)?)
        }
        ProviderKind::Ollama => Arc::new(OllamaGateway::new(&providers.ollama)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ollama_needs_no_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let gateway =
            build_gateway(ProviderKind::Ollama, &FileProvidersConfig::default(), dir.path())
                .unwrap();
        assert_eq!(gateway.model_name(), "qwen3:4b");
    }

    #[test]
    fn test_build_anthropic_with_config_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut providers = FileProvidersConfig::default();
        providers.anthropic.api_key = Some("sk-test".to_string());

        let gateway = build_gateway(ProviderKind::Anthropic, &providers, dir.path()).unwrap();
        assert_eq!(gateway.model_name(), "claude-3-5-sonnet-20240620");
    }

    #[test]
    fn test_provider_kind_serde() {
        let kind: ProviderKind = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(kind, ProviderKind::Ollama);
        assert_eq!(ProviderKind::default().to_string(), "anthropic");
    }
}
