//! Anthropic messages API adapter.
//!
//! `POST {base_url}/v1/messages` with the instruction block as `system` and
//! the conversation as `messages`. Consecutive turns with the same role
//! (several tool results in a row) are merged into one message.

use super::http;
use crate::config::FileAnthropicConfig;
use async_trait::async_trait;
use quill_application::{GatewayError, LlmGateway};
use quill_domain::{Conversation, Role};
use serde_json::{Value, json};
use tracing::debug;

pub struct AnthropicGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    api_version: String,
}

impl AnthropicGateway {
    pub fn new(config: &FileAnthropicConfig, api_key: String) -> Result<Self, GatewayError> {
        Ok(Self {
            http: http::client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_version: config.api_version.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches("/v1"))
    }

    pub fn request_body(&self, instructions: &str, conversation: &Conversation) -> Value {
        let mut messages: Vec<(Role, String)> = Vec::new();
        for turn in conversation.turns() {
            match messages.last_mut() {
                Some((role, content)) if *role == turn.role => {
                    content.push_str("\n\n");
                    content.push_str(&turn.content);
                }
                _ => messages.push((turn.role, turn.content.clone())),
            }
        }

        let messages: Vec<Value> = messages
            .into_iter()
            .map(|(role, content)| json!({ "role": role.as_str(), "content": content }))
            .collect();

        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": instructions,
            "messages": messages,
        })
    }

    /// Concatenated text blocks of a messages API response.
    pub fn extract_text(body: &Value) -> Result<String, GatewayError> {
        let blocks = body
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| GatewayError::InvalidResponse(format!("no content in {}", body)))?;

        Ok(blocks
            .iter()
            .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl LlmGateway for AnthropicGateway {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        instructions: &str,
        conversation: &Conversation,
    ) -> Result<String, GatewayError> {
        let url = self.endpoint();
        debug!(model = %self.model, turns = conversation.len(), "Anthropic request");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&self.request_body(instructions, conversation))
            .send()
            .await
            .map_err(|e| http::send_error(e, &url))?;

        let body = http::read_json(response, &self.model).await?;
        let text = Self::extract_text(&body)?;
        let stop_reason = body
            .get("stop_reason")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("?");
        debug!(
            stop_reason,
            chars = text.len(),
            "Anthropic response"
        );
        Ok(text)
    }
}
