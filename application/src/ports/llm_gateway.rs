//! LLM Gateway port
//!
//! Defines the interface for getting completions from an inference backend.

use async_trait::async_trait;
use quill_domain::Conversation;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway to a conversational inference backend
///
/// Takes the leading instruction block plus the full ordered conversation and
/// returns one raw completion. Implementations (adapters) live in the
/// infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Model identifier, for display and logs
    fn model_name(&self) -> &str;

    /// Produce the next assistant completion.
    async fn complete(
        &self,
        instructions: &str,
        conversation: &Conversation,
    ) -> Result<String, GatewayError>;
}
