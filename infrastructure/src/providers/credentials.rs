//! API key resolution for the Anthropic backend
//!
//! Sources, first match wins:
//!
//! 1. `providers.anthropic.api_key` in the config
//! 2. the environment variable named by `providers.anthropic.api_key_env`
//! 3. `ANTHROPIC_AUTH_TOKEN` in the JSON credentials file (`env.json`)

use crate::config::FileAnthropicConfig;
use quill_application::GatewayError;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Key looked up in the credentials file
pub const CREDENTIALS_FILE_KEY: &str = "ANTHROPIC_AUTH_TOKEN";

/// Resolve the API key from config, process environment and credentials file.
pub fn resolve_anthropic_key(
    config: &FileAnthropicConfig,
    base_dir: &Path,
) -> Result<String, GatewayError> {
    resolve_with(config, base_dir, |name| std::env::var(name).ok())
}

fn resolve_with(
    config: &FileAnthropicConfig,
    base_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, GatewayError> {
    if let Some(key) = non_empty(config.api_key.as_deref()) {
        debug!("Using API key from config");
        return Ok(key);
    }

    if let Some(key) = non_empty(env(&config.api_key_env).as_deref()) {
        debug!("Using API key from ${}", config.api_key_env);
        return Ok(key);
    }

    let path = base_dir.join(&config.credentials_file);
    if path.is_file() {
        let text = std::fs::read_to_string(&path).map_err(|e| {
            GatewayError::AuthenticationFailed(format!("cannot read {}: {}", path.display(), e))
        })?;
        let json: Value = serde_json::from_str(&text).map_err(|e| {
            GatewayError::AuthenticationFailed(format!("{} is not valid JSON: {}", path.display(), e))
        })?;
        return match non_empty(json.get(CREDENTIALS_FILE_KEY).and_then(Value::as_str)) {
            Some(key) => {
                debug!("Using API key from {}", path.display());
                Ok(key)
            }
            None => Err(GatewayError::AuthenticationFailed(format!(
                "{} has no {} entry",
                path.display(),
                CREDENTIALS_FILE_KEY
            ))),
        };
    }

    Err(GatewayError::AuthenticationFailed(format!(
        "no API key found: set ${}, providers.anthropic.api_key, or {} in {}",
        config.api_key_env, CREDENTIALS_FILE_KEY, config.credentials_file
    )))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_config_key_wins() {
        let dir = TempDir::new().unwrap();
        let config = FileAnthropicConfig {
            api_key: Some(" sk-config ".to_string()),
            ..Default::default()
        };
        let key = resolve_with(&config, dir.path(), |_| Some("sk-env".to_string())).unwrap();
        assert_eq!(key, "sk-config");
    }

    #[test]
    fn test_env_before_credentials_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("env.json"), r#"{"ANTHROPIC_AUTH_TOKEN": "sk-file"}"#)
            .unwrap();
        let config = FileAnthropicConfig::default();

        let key = resolve_with(&config, dir.path(), |name| {
            (name == "ANTHROPIC_API_KEY").then(|| "sk-env".to_string())
        })
        .unwrap();
        assert_eq!(key, "sk-env");

        let key = resolve_with(&config, dir.path(), no_env).unwrap();
        assert_eq!(key, "sk-file");
    }

    #[test]
    fn test_credentials_file_token_is_trimmed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("env.json"),
            "{\"ANTHROPIC_AUTH_TOKEN\": \"sk-file\\n\"}",
        )
        .unwrap();
        let key = resolve_with(&FileAnthropicConfig::default(), dir.path(), no_env).unwrap();
        assert_eq!(key, "sk-file");
    }

    #[test]
    fn test_missing_credentials() {
        let dir = TempDir::new().unwrap();
        let err = resolve_with(&FileAnthropicConfig::default(), dir.path(), no_env).unwrap_err();
        assert!(matches!(err, GatewayError::AuthenticationFailed(ref m) if m.contains("ANTHROPIC_API_KEY")));

        std::fs::write(dir.path().join("env.json"), r#"{"OTHER": "x"}"#).unwrap();
        let err = resolve_with(&FileAnthropicConfig::default(), dir.path(), no_env).unwrap_err();
        assert!(err.to_string().contains("has no ANTHROPIC_AUTH_TOKEN"));
    }
}
