//! Progress reporting for the orchestration loop

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use quill_application::TurnProgressNotifier;
use quill_domain::{RejectedCandidate, ToolCall, ToolResultEnvelope};
use std::sync::Mutex;
use std::time::Duration;

/// Reports turn progress with a spinner while the model is inferring
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            quiet: false,
        }
    }

    /// Hide the spinner and tool lines; answers and errors still print
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }

    /// Print a line without tearing a running spinner
    fn println(&self, line: String) {
        if let Ok(guard) = self.spinner.lock()
            && let Some(pb) = guard.as_ref()
        {
            pb.println(line);
            return;
        }
        println!("{}", line);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnProgressNotifier for ProgressReporter {
    fn on_inference_start(&self, iteration: usize) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix("Thinking");
        if iteration > 1 {
            pb.set_message(format!("(round {})", iteration));
        }
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.spinner.lock()
            && let Some(old) = guard.replace(pb)
        {
            old.finish_and_clear();
        }
    }

    fn on_inference_end(&self) {
        self.clear_spinner();
    }

    fn on_tool_call(&self, call: &ToolCall) {
        if !self.quiet {
            self.println(ConsoleFormatter::format_tool_call(call));
        }
    }

    fn on_tool_result(&self, _call: &ToolCall, envelope: &ToolResultEnvelope) {
        if !self.quiet {
            self.println(ConsoleFormatter::format_tool_result(envelope));
        }
    }

    fn on_malformed_calls(&self, rejected: &[RejectedCandidate]) {
        if !self.quiet {
            self.println(format!(
                "{}\n{}",
                "Ignored malformed tool calls:".yellow(),
                ConsoleFormatter::format_rejected(rejected)
            ));
        }
    }

    fn on_answer(&self, answer: &str) {
        self.clear_spinner();
        println!("{}\n", ConsoleFormatter::format_answer(answer));
    }

    fn on_turn_error(&self, message: &str) {
        self.clear_spinner();
        eprintln!("{}\n", ConsoleFormatter::format_error(message));
    }
}

/// Simple text-based progress (no spinner), for piped output
pub struct SimpleProgress {
    quiet: bool,
}

impl SimpleProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl TurnProgressNotifier for SimpleProgress {
    fn on_tool_call(&self, call: &ToolCall) {
        if !self.quiet {
            println!("{}", ConsoleFormatter::format_tool_call(call));
        }
    }

    fn on_tool_result(&self, _call: &ToolCall, envelope: &ToolResultEnvelope) {
        if !self.quiet {
            println!("{}", ConsoleFormatter::format_tool_result(envelope));
        }
    }

    fn on_answer(&self, answer: &str) {
        println!("{}", ConsoleFormatter::format_answer(answer));
    }

    fn on_turn_error(&self, message: &str) {
        eprintln!("{}", ConsoleFormatter::format_error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_lifecycle() {
        let reporter = ProgressReporter::new();
        reporter.on_inference_start(1);
        assert!(reporter.spinner.lock().unwrap().is_some());
        reporter.on_inference_start(2);
        reporter.on_inference_end();
        assert!(reporter.spinner.lock().unwrap().is_none());
    }

    #[test]
    fn test_quiet_never_starts_spinner() {
        let reporter = ProgressReporter::new().with_quiet(true);
        reporter.on_inference_start(1);
        assert!(reporter.spinner.lock().unwrap().is_none());
    }

    #[test]
    fn test_answer_clears_spinner() {
        let reporter = ProgressReporter::new();
        reporter.on_inference_start(1);
        reporter.on_answer("done");
        assert!(reporter.spinner.lock().unwrap().is_none());
    }
}
