//! REPL (Read-Eval-Print Loop) for interactive chat
//!
//! [`ChatRepl`] is the terminal side of the session loop: it implements
//! [`UserInputPort`] and handles slash commands itself, so the session only
//! ever sees lines meant for the model.

use crate::ConsoleFormatter;
use colored::Colorize;
use quill_application::{UserInput, UserInputPort};
use quill_domain::{ToolDefinition, TransportMode};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;
use std::path::PathBuf;

/// What a slash command asks the REPL to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandAction {
    Continue,
    Quit,
}

/// Interactive chat REPL
pub struct ChatRepl {
    editor: Option<DefaultEditor>,
    history_path: Option<PathBuf>,
    tools: Vec<ToolDefinition>,
    model: String,
    transport: TransportMode,
}

impl ChatRepl {
    /// Create a new ChatRepl listing `tools` under `/tools`
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        let mut editor = DefaultEditor::new().ok();
        let history_path = dirs::data_dir().map(|p| p.join("quill").join("history.txt"));

        if let (Some(rl), Some(path)) = (editor.as_mut(), history_path.as_ref()) {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        Self {
            editor,
            history_path,
            tools,
            model: String::new(),
            transport: TransportMode::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportMode) -> Self {
        self.transport = transport;
        self
    }

    pub fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│                quill - chat                 │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("{} {}", "Model:".cyan().bold(), self.model);
        println!(
            "{} {} ({} tools)",
            "Transport:".cyan().bold(),
            self.transport,
            self.tools.len()
        );
        println!();
        println!("Type /help for commands, 'exit' or Ctrl-D to leave.");
        println!();
    }

    /// Handle slash commands.
    fn handle_command(cmd: &str, tools: &[ToolDefinition]) -> CommandAction {
        match cmd {
            "/quit" | "/exit" | "/q" => CommandAction::Quit,
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?    - Show this help");
                println!("  /tools           - List the tools the model can call");
                println!("  /quit, /exit, /q - Exit chat");
                println!();
                println!("Ctrl-C while the model works cancels the turn.");
                println!();
                CommandAction::Continue
            }
            "/tools" => {
                println!();
                print!("{}", ConsoleFormatter::format_tools(tools));
                println!();
                CommandAction::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                CommandAction::Continue
            }
        }
    }

    /// One raw read, from the line editor or plain stdin when the terminal
    /// does not support editing.
    fn read_line(&mut self) -> UserInput {
        let prompt = ConsoleFormatter::user_prompt();

        let Some(rl) = self.editor.as_mut() else {
            print!("{}", prompt);
            let _ = std::io::Write::flush(&mut std::io::stdout());
            let mut line = String::new();
            return match std::io::stdin().lock().read_line(&mut line) {
                Ok(0) | Err(_) => UserInput::EndOfInput,
                Ok(_) => UserInput::Line(line),
            };
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                UserInput::Line(line)
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                UserInput::EndOfInput
            }
            Err(ReadlineError::Eof) => UserInput::EndOfInput,
            Err(err) => {
                eprintln!("{}", ConsoleFormatter::format_error(&err.to_string()));
                UserInput::EndOfInput
            }
        }
    }
}

impl UserInputPort for ChatRepl {
    fn read_input(&mut self) -> UserInput {
        loop {
            let line = match self.read_line() {
                UserInput::Line(line) => line,
                UserInput::EndOfInput => {
                    println!("Bye!");
                    return UserInput::EndOfInput;
                }
            };

            let trimmed = line.trim();
            if !trimmed.starts_with('/') {
                return UserInput::Line(line);
            }
            if Self::handle_command(trimmed, &self.tools) == CommandAction::Quit {
                println!("Bye!");
                return UserInput::EndOfInput;
            }
        }
    }
}

impl Drop for ChatRepl {
    fn drop(&mut self) {
        if let (Some(rl), Some(path)) = (self.editor.as_mut(), self.history_path.as_ref()) {
            let _ = rl.save_history(path);
        }
    }
}
