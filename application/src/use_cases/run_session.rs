//! Run Session use case.
//!
//! The outer loop: wait for user input, run a turn, report the answer or the
//! error, repeat. The session owns the [`Conversation`] for its whole life
//! and ends only on end of input or an explicit quit token.

use crate::ports::progress::TurnProgressNotifier;
use crate::ports::user_input::{UserInput, UserInputPort};
use crate::use_cases::run_turn::RunTurnUseCase;
use quill_domain::{Conversation, LoopState};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Inputs that end the session, compared case-insensitively after trimming
pub const QUIT_TOKENS: &[&str] = &["exit", "quit"];

/// Whether a line of user input asks to end the session.
pub fn is_quit_token(input: &str) -> bool {
    let input = input.trim();
    QUIT_TOKENS.iter().any(|t| input.eq_ignore_ascii_case(t))
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns_answered: usize,
    pub turns_failed: usize,
}

/// Use case for running an interactive session.
pub struct RunSessionUseCase {
    turn: RunTurnUseCase,
    interrupt_on_ctrl_c: bool,
}

impl RunSessionUseCase {
    pub fn new(turn: RunTurnUseCase) -> Self {
        Self {
            turn,
            interrupt_on_ctrl_c: false,
        }
    }

    /// Cancel the running turn on Ctrl-C instead of letting the signal end
    /// the process.
    pub fn with_ctrl_c_interrupt(mut self, enabled: bool) -> Self {
        self.interrupt_on_ctrl_c = enabled;
        self
    }

    pub fn turn(&self) -> &RunTurnUseCase {
        &self.turn
    }

    /// Run until end of input or a quit token.
    pub async fn run(
        &self,
        input: &mut dyn UserInputPort,
        progress: &dyn TurnProgressNotifier,
    ) -> SessionSummary {
        let mut conversation = Conversation::new();
        let mut summary = SessionSummary::default();

        info!("Session started with model {}", self.turn.model_name());

        loop {
            // ==================== AwaitingUserInput ====================
            progress.on_state_change(LoopState::AwaitingUserInput);
            let line = match input.read_input() {
                UserInput::Line(line) => line,
                UserInput::EndOfInput => {
                    debug!("End of input");
                    break;
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_quit_token(line) {
                debug!("Quit token received");
                break;
            }

            let cancel = CancellationToken::new();
            let watcher = self.interrupt_on_ctrl_c.then(|| {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel.cancel();
                    }
                })
            });

            let result = self
                .turn
                .execute(&mut conversation, line, progress, &cancel)
                .await;

            if let Some(watcher) = watcher {
                watcher.abort();
            }

            match result {
                Ok(output) => {
                    summary.turns_answered += 1;
                    progress.on_answer(&output.answer);
                }
                Err(e) => {
                    summary.turns_failed += 1;
                    progress.on_turn_error(&e.to_string());
                }
            }
        }

        info!(
            "Session ended: {} answered, {} failed",
            summary.turns_answered, summary.turns_failed
        );
        summary
    }
}
