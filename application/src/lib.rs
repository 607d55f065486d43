//! Application layer for quill
//!
//! This crate contains the orchestration loop use cases and the ports they
//! talk through. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoProgress, TurnProgressNotifier},
    tool_executor::ToolExecutorPort,
    user_input::{ScriptedInput, UserInput, UserInputPort},
};
pub use use_cases::run_session::{QUIT_TOKENS, RunSessionUseCase, SessionSummary, is_quit_token};
pub use use_cases::run_turn::{RunTurnError, RunTurnUseCase, TurnOutput};
