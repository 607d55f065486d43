//! Ollama adapter using the native `/api/chat` endpoint.
//!
//! Non-streaming: one request, one `message.content`. The instruction block
//! travels as the leading `system` message.

use super::http;
use crate::config::FileOllamaConfig;
use async_trait::async_trait;
use quill_application::{GatewayError, LlmGateway};
use quill_domain::Conversation;
use serde_json::{Value, json};
use tracing::debug;

pub struct OllamaGateway {
    http: reqwest::Client,
    host: String,
    model: String,
    temperature: f32,
}

impl OllamaGateway {
    pub fn new(config: &FileOllamaConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            http: http::client()?,
            host: normalize_host(&config.host),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn request_body(&self, instructions: &str, conversation: &Conversation) -> Value {
        let mut messages = vec![json!({ "role": "system", "content": instructions })];
        messages.extend(
            conversation
                .turns()
                .iter()
                .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.content })),
        );

        json!({
            "model": self.model,
            "stream": false,
            "messages": messages,
            "options": { "temperature": self.temperature },
        })
    }

    /// `message.content` of a chat response, without any leading
    /// `<think>` block reasoning models put before the reply.
    pub fn extract_text(body: &Value) -> Result<String, GatewayError> {
        if let Some(error) = body.get("error").and_then(Value::as_str) {
            return Err(GatewayError::RequestFailed(error.to_string()));
        }
        let content = body
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::InvalidResponse(format!("no message in {}", body)))?;
        Ok(strip_think_block(content).to_string())
    }
}

fn strip_think_block(content: &str) -> &str {
    let trimmed = content.trim_start();
    if trimmed.starts_with("<think>")
        && let Some(end) = trimmed.find("</think>")
    {
        return trimmed[end + "</think>".len()..].trim_start();
    }
    content
}

/// `127.0.0.1:11434` → `http://127.0.0.1:11434`; trailing slashes removed.
fn normalize_host(host: &str) -> String {
    let mut host = host.trim().to_string();
    if host.is_empty() {
        host = "http://127.0.0.1:11434".to_string();
    }
    if !host.starts_with("http://") && !host.starts_with("https://") {
        host = format!("http://{}", host);
    }
    host.trim_end_matches('/').to_string()
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        instructions: &str,
        conversation: &Conversation,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/api/chat", self.host);
        debug!(model = %self.model, turns = conversation.len(), "Ollama request");

        let response = self
            .http
            .post(&url)
            .json(&self.request_body(instructions, conversation))
            .send()
            .await
            .map_err(|e| match http::send_error(e, &url) {
                GatewayError::ConnectionError(message) => GatewayError::ConnectionError(format!(
                    "{} (is it running? try `ollama serve`)",
                    message
                )),
                other => other,
            })?;

        let body = http::read_json(response, &self.model).await?;
        Self::extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> OllamaGateway {
        OllamaGateway::new(&FileOllamaConfig::default()).unwrap()
    }

    #[test]
    fn test_request_body_leads_with_system_message() {
        let mut conversation = Conversation::new();
        conversation.push_user("hi");

        let body = gateway().request_body("rules", &conversation);
        assert_eq!(body["model"], "qwen3:4b");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "rules"}));
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "hi"}));
        assert!((body["options"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_extract_text() {
        let body = json!({"message": {"role": "assistant", "content": "Hello"}, "done": true});
        assert_eq!(OllamaGateway::extract_text(&body).unwrap(), "Hello");

        let thinking = json!({"message": {"content": "<think>\nhmm\n</think>\n\n{\"tool\": \"x\"}"}});
        assert_eq!(OllamaGateway::extract_text(&thinking).unwrap(), "{\"tool\": \"x\"}");

        let error = json!({"error": "model not loaded"});
        assert!(matches!(
            OllamaGateway::extract_text(&error),
            Err(GatewayError::RequestFailed(_))
        ));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("localhost:11434/"), "http://localhost:11434");
        assert_eq!(normalize_host("https://gpu.box"), "https://gpu.box");
        assert_eq!(normalize_host(""), "http://127.0.0.1:11434");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        let config = FileOllamaConfig {
            host: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let gateway = OllamaGateway::new(&config).unwrap();
        let mut conversation = Conversation::new();
        conversation.push_user("hi");

        let err = gateway.complete("", &conversation).await.unwrap_err();
        assert!(matches!(err, GatewayError::ConnectionError(ref m) if m.contains("ollama serve")));
    }
}
