//! Local tool executor, the in-process implementation of [`ToolExecutorPort`].
//!
//! # Execution Path
//!
//! ```text
//! ToolExecutorPort::execute()
//!   ├─ registry.resolve()      unknown name   → error envelope
//!   ├─ validator.prepare()     bad arguments  → error envelope
//!   └─ spawn_blocking(handler) Err / panic    → error envelope
//! ```
//!
//! Nothing a handler does can escape as a fault: every path ends in an
//! envelope the model can read.

use std::sync::Arc;

use async_trait::async_trait;
use quill_application::ToolExecutorPort;
use quill_domain::{
    DefaultToolValidator, ToolCall, ToolError, ToolResultEnvelope, ToolSpec, ToolValidator,
};
use tracing::{debug, warn};

use super::registry::ToolRegistry;

/// Executor that runs registered tools on the local machine.
#[derive(Debug, Clone)]
pub struct LocalToolExecutor {
    registry: Arc<ToolRegistry>,
    validator: DefaultToolValidator,
}

impl LocalToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    pub fn from_shared(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            validator: DefaultToolValidator,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[async_trait]
impl ToolExecutorPort for LocalToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        self.registry.spec()
    }

    async fn execute(&self, call: &ToolCall) -> ToolResultEnvelope {
        let name = call.tool_name.as_str();
        let handler = match self.registry.resolve(name) {
            Ok(handler) => handler,
            Err(e) => {
                warn!(tool = %name, "Unknown tool requested");
                return ToolResultEnvelope::error(name, name, &e);
            }
        };

        let prepared = match self.registry.spec().get(name) {
            Some(definition) => self.validator.prepare(call, definition),
            None => Ok(call.clone()),
        };
        let prepared = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!(tool = %name, error = %e, "Rejected tool arguments");
                return ToolResultEnvelope::error(name, handler.target(call), &e);
            }
        };

        debug!(tool = %name, args = %prepared.arguments_json(), "Executing tool");

        let target = handler.target(&prepared);
        let task = {
            let handler = Arc::clone(&handler);
            let prepared = prepared.clone();
            tokio::task::spawn_blocking(move || handler.call(&prepared))
        };

        match task.await {
            Ok(Ok(envelope)) => {
                debug!(tool = %name, outcome = envelope.outcome.as_str(), "Tool finished");
                envelope
            }
            Ok(Err(e)) => {
                debug!(tool = %name, error = %e, "Tool failed");
                ToolResultEnvelope::error(name, target, &e)
            }
            Err(join_error) => {
                warn!(tool = %name, "Tool handler panicked: {}", join_error);
                ToolResultEnvelope::error(
                    name,
                    target,
                    &ToolError::execution_failed(format!("tool handler crashed: {}", join_error)),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::default_registry;
    use crate::tools::path::PathResolver;
    use quill_domain::{ToolDefinition, ToolOutcome};
    use std::fs;
    use tempfile::TempDir;

    fn executor(dir: &TempDir) -> LocalToolExecutor {
        LocalToolExecutor::new(default_registry(PathResolver::new(dir.path())))
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_error_envelope() {
        let dir = TempDir::new().unwrap();
        let envelope = executor(&dir).execute(&ToolCall::new("delete_all")).await;

        assert_eq!(envelope.outcome, ToolOutcome::Error);
        assert_eq!(envelope.error_message(), Some("Unknown tool: delete_all"));
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let dir = TempDir::new().unwrap();
        let envelope = executor(&dir).execute(&ToolCall::new("read_file")).await;

        assert!(envelope.is_error());
        assert_eq!(envelope.detail["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_defaults_are_applied() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        // list_files without a path lists the working directory.
        let envelope = executor(&dir).execute(&ToolCall::new("list_files")).await;
        assert_eq!(envelope.outcome, ToolOutcome::Ok);
        assert_eq!(envelope.path_or_target, dir.path().display().to_string());
        assert_eq!(envelope.detail["files"][0]["filename"], "a.txt");

        // edit_file without old_str creates.
        let create = ToolCall::new("edit_file")
            .with_arg("path", "new.txt")
            .with_arg("new_str", "hello");
        let envelope = executor(&dir).execute(&create).await;
        assert_eq!(envelope.outcome, ToolOutcome::Created);
        assert_eq!(fs::read_to_string(dir.path().join("new.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_handler_error_becomes_envelope_with_target() {
        let dir = TempDir::new().unwrap();
        let call = ToolCall::new("read_file").with_arg("filename", "missing.txt");
        let envelope = executor(&dir).execute(&call).await;

        assert!(envelope.is_error());
        assert_eq!(envelope.error_message(), Some("file not found"));
        assert_eq!(
            envelope.path_or_target,
            dir.path().join("missing.txt").display().to_string()
        );
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new("boom", "Always panics"),
                |_: &ToolCall| -> Result<ToolResultEnvelope, ToolError> { panic!("boom") },
            )
            .unwrap();

        let envelope = LocalToolExecutor::new(registry)
            .execute(&ToolCall::new("boom"))
            .await;
        assert!(envelope.is_error());
        assert!(envelope.error_message().unwrap().contains("crashed"));
    }

    // ==================== Through the orchestration loop ====================

    use async_trait::async_trait;
    use quill_application::{GatewayError, LlmGateway, NoProgress, RunTurnUseCase};
    use quill_domain::{Conversation, GrammarKind, RESULT_PREFIX, Role};
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    /// Replays canned completions in order.
    struct ScriptedGateway {
        completions: Mutex<VecDeque<String>>,
    }

    impl ScriptedGateway {
        fn new(completions: &[&str]) -> Self {
            Self {
                completions: Mutex::new(completions.iter().map(|c| c.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _instructions: &str,
            _conversation: &Conversation,
        ) -> Result<String, GatewayError> {
            self.completions
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("script exhausted".to_string()))
        }
    }

    fn result_envelopes(conversation: &Conversation) -> Vec<Value> {
        conversation
            .turns()
            .iter()
            .filter(|t| t.role == Role::User)
            .filter_map(|t| t.content.strip_prefix(RESULT_PREFIX))
            .map(|json| serde_json::from_str(json.trim()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_file_scenarios_through_the_loop() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("greeting.txt"), "Hi Alice, meet Alice.").unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let gateway = Arc::new(ScriptedGateway::new(&[
            r#"tool: edit_file({"path": "greeting.txt", "old_str": "Alice", "new_str": "Bob"})"#,
            "Renamed the first Alice.",
            "Creating it now.\n\
             tool: edit_file({\"path\": \"out.txt\", \"old_str\": \"\", \"new_str\": \"hello\"})\n\
             tool: list_files({\"path\": \"empty\"})",
            "Wrote out.txt; the empty directory has no entries.",
        ]));
        let turn = RunTurnUseCase::new(gateway, Arc::new(executor(&dir)), GrammarKind::Line);
        let cancel = CancellationToken::new();
        let mut conversation = Conversation::new();

        let output = turn
            .execute(&mut conversation, "rename Alice to Bob once", &NoProgress, &cancel)
            .await
            .unwrap();
        assert_eq!(output.answer, "Renamed the first Alice.");
        assert_eq!(
            fs::read_to_string(dir.path().join("greeting.txt")).unwrap(),
            "Hi Bob, meet Alice."
        );

        let output = turn
            .execute(&mut conversation, "create out.txt, then list empty/", &NoProgress, &cancel)
            .await
            .unwrap();
        assert_eq!(output.tool_calls, 2);
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hello");

        let envelopes = result_envelopes(&conversation);
        assert_eq!(envelopes.len(), 3);
        assert_eq!(envelopes[0]["outcome"], "edited");
        assert_eq!(envelopes[1]["outcome"], "created");
        assert_eq!(envelopes[2]["outcome"], "ok");
        assert_eq!(envelopes[2]["files"], serde_json::json!([]));
        assert_eq!(conversation.last().unwrap().role, Role::Assistant);
    }
}
