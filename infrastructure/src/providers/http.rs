//! HTTP plumbing shared by the backends

use quill_application::GatewayError;
use serde_json::Value;
use std::time::Duration;

/// Completions can take a while on local models.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub(super) fn client() -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| GatewayError::Other(format!("failed to build HTTP client: {}", e)))
}

pub(super) fn send_error(e: reqwest::Error, url: &str) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(format!("failed to reach {}: {}", url, e))
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// Body of a successful response as JSON; HTTP errors become gateway errors.
pub(super) async fn read_json(
    response: reqwest::Response,
    model: &str,
) -> Result<Value, GatewayError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| GatewayError::InvalidResponse(format!("failed to read body: {}", e)))?;

    if !status.is_success() {
        let message = error_message(&text);
        return Err(match status.as_u16() {
            401 | 403 => GatewayError::AuthenticationFailed(message),
            404 => GatewayError::ModelNotAvailable(format!("{}: {}", model, message)),
            _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status, message)),
        });
    }

    serde_json::from_str(&text)
        .map_err(|e| GatewayError::InvalidResponse(format!("{}: {}", e, truncate(&text))))
}

/// Readable message from an error body: `{"error": {"message": ..}}`,
/// `{"error": ".."}`, or the raw text.
pub(super) fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return truncate(body);
    };
    match json.get("error") {
        Some(Value::String(message)) => message.clone(),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        None => truncate(body),
    }
}

fn truncate(text: &str) -> String {
    const LIMIT: usize = 500;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
