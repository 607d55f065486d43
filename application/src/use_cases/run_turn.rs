//! Run Turn use case.
//!
//! Drives one user turn through the orchestration loop:
//!
//! ```text
//! user turn ─▶ Inferring ─▶ Deciding ─┬─ no calls ─▶ Answering (assistant turn, done)
//!                  ▲                  │
//!                  │                  └─ calls ───▶ Invoking
//!                  │                                 ├─ assistant turn (raw completion)
//!                  └──────────────────────────────── └─ one result turn per call, in parse order
//! ```
//!
//! Tool failures of every kind come back as envelopes and keep the loop
//! going. Only backend failures, cancellation and the iteration guard end the
//! turn early, and they leave the conversation as it was before the turn.

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::TurnProgressNotifier;
use crate::ports::tool_executor::ToolExecutorPort;
use quill_domain::{
    Conversation, DomainError, ExecutionMode, GrammarKind, InvocationParser, LoopState,
    PromptAssembler, ToolCall, ToolError, ToolResultEnvelope,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a turn early.
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RunTurnError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunTurnError::Domain(e) if e.is_cancelled())
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutput {
    /// The final answer, exactly as the model produced it
    pub answer: String,
    /// Number of tool rounds before the answer
    pub iterations: usize,
    /// Number of tool calls executed across all rounds
    pub tool_calls: usize,
}

/// Use case for running one user turn.
pub struct RunTurnUseCase {
    gateway: Arc<dyn LlmGateway>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    parser: Arc<dyn InvocationParser>,
    instructions: String,
    params: ExecutionParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Clone for RunTurnUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tool_executor: self.tool_executor.clone(),
            parser: self.parser.clone(),
            instructions: self.instructions.clone(),
            params: self.params.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl RunTurnUseCase {
    /// Build the use case for a grammar, rendering the instruction block once
    /// from the executor's catalog.
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        grammar: GrammarKind,
    ) -> Self {
        let instructions =
            PromptAssembler::assemble(tool_executor.tool_spec().definitions(), grammar);
        Self {
            gateway,
            tool_executor,
            parser: Arc::from(grammar.parser()),
            instructions,
            params: ExecutionParams::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Replace the invocation parser.
    pub fn with_parser(mut self, parser: Arc<dyn InvocationParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the leading instruction block.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    pub fn tool_executor(&self) -> &Arc<dyn ToolExecutorPort> {
        &self.tool_executor
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }

    /// Run one user turn to its final answer.
    ///
    /// On error the conversation is truncated back to its length on entry.
    pub async fn execute(
        &self,
        conversation: &mut Conversation,
        user_input: &str,
        progress: &dyn TurnProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<TurnOutput, RunTurnError> {
        let checkpoint = conversation.len();
        let result = self
            .run_loop(conversation, user_input, progress, cancel)
            .await;

        if let Err(e) = &result {
            conversation.truncate(checkpoint);
            warn!("Turn failed: {}", e);
            self.conversation_logger.log(ConversationEvent::new(
                "turn_error",
                json!({ "error": e.to_string() }),
            ));
        }
        progress.on_state_change(LoopState::AwaitingUserInput);
        result
    }

    async fn run_loop(
        &self,
        conversation: &mut Conversation,
        user_input: &str,
        progress: &dyn TurnProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<TurnOutput, RunTurnError> {
        conversation.push_user(user_input);
        self.conversation_logger.log(ConversationEvent::new(
            "user_message",
            json!({ "text": user_input }),
        ));

        let mut iteration = 0usize;
        let mut tool_calls = 0usize;

        loop {
            // ==================== Inferring ====================
            progress.on_state_change(LoopState::Inferring);
            progress.on_inference_start(iteration + 1);
            let completion = tokio::select! {
                result = self.gateway.complete(&self.instructions, conversation) => result,
                _ = cancel.cancelled() => {
                    progress.on_inference_end();
                    return Err(DomainError::Cancelled.into());
                }
            };
            progress.on_inference_end();
            let raw = completion?;

            self.conversation_logger.log(ConversationEvent::new(
                "assistant_message",
                json!({
                    "model": self.gateway.model_name(),
                    "iteration": iteration + 1,
                    "bytes": raw.len(),
                    "text": raw,
                }),
            ));

            // ==================== Deciding ====================
            progress.on_state_change(LoopState::Deciding);
            let parsed = self.parser.parse_detailed(&raw);
            if !parsed.rejected.is_empty() {
                debug!("{} malformed call candidate(s) in completion", parsed.rejected.len());
                progress.on_malformed_calls(&parsed.rejected);
            }
            let note = self.params.malformed_calls.feedback(&parsed.rejected);

            if parsed.calls.is_empty() && note.is_none() {
                // ==================== Answering ====================
                progress.on_state_change(LoopState::Answering);
                conversation.push_assistant(raw.clone());
                info!(
                    "Turn answered after {} tool round(s), {} call(s)",
                    iteration, tool_calls
                );
                return Ok(TurnOutput {
                    answer: raw,
                    iterations: iteration,
                    tool_calls,
                });
            }

            // ==================== Invoking ====================
            iteration += 1;
            if self.params.exceeds_limit(iteration) {
                let max = self.params.max_iterations.unwrap_or(iteration);
                warn!("Tool loop exceeded max_iterations ({})", max);
                return Err(DomainError::IterationLimitExceeded(max).into());
            }

            progress.on_state_change(LoopState::Invoking);
            conversation.push_assistant(raw);

            let envelopes = self.execute_batch(&parsed.calls, progress, cancel).await?;
            for (call, envelope) in parsed.calls.iter().zip(&envelopes) {
                conversation.push_user(PromptAssembler::render_result(envelope));
                progress.on_tool_result(call, envelope);
                self.conversation_logger.log(ConversationEvent::new(
                    "tool_result",
                    json!({
                        "tool": call.tool_name,
                        "outcome": envelope.outcome.as_str(),
                        "envelope": envelope,
                    }),
                ));
            }
            tool_calls += parsed.calls.len();

            if let Some(note) = note {
                conversation.push_user(note);
            }

            debug!(
                "Tool round {} done: {} call(s), {} turn(s) in conversation",
                iteration,
                parsed.calls.len(),
                conversation.len()
            );
        }
    }

    /// Execute a batch of calls, returning one envelope per call in call order.
    async fn execute_batch(
        &self,
        calls: &[ToolCall],
        progress: &dyn TurnProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<Vec<ToolResultEnvelope>, RunTurnError> {
        for call in calls {
            progress.on_tool_call(call);
            self.conversation_logger.log(ConversationEvent::new(
                "tool_call",
                json!({ "tool": call.tool_name, "args": call.arguments_value() }),
            ));
        }

        match self.params.execution_mode {
            ExecutionMode::Sequential => {
                let mut envelopes = Vec::with_capacity(calls.len());
                for call in calls {
                    let envelope = tokio::select! {
                        envelope = self.dispatch(call) => envelope,
                        _ = cancel.cancelled() => return Err(DomainError::Cancelled.into()),
                    };
                    envelopes.push(envelope);
                }
                Ok(envelopes)
            }
            ExecutionMode::Concurrent => {
                let futures = calls.iter().map(|call| self.dispatch(call));
                tokio::select! {
                    envelopes = futures::future::join_all(futures) => Ok(envelopes),
                    _ = cancel.cancelled() => Err(DomainError::Cancelled.into()),
                }
            }
        }
    }

    /// Resolve and execute one call. Unknown names never reach the executor.
    async fn dispatch(&self, call: &ToolCall) -> ToolResultEnvelope {
        if !self.tool_executor.has_tool(&call.tool_name) {
            warn!(tool = %call.tool_name, "Model requested an unknown tool");
            return ToolResultEnvelope::error(
                &call.tool_name,
                &call.tool_name,
                &ToolError::unknown_tool(&call.tool_name),
            );
        }

        debug!(tool = %call.tool_name, "Executing tool");
        self.tool_executor.execute(call).await
    }
}
