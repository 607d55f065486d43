//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use quill_domain::TransportMode;
use std::path::PathBuf;

/// How tool calls reach the tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    /// In-process tools, `tool: NAME({json})` lines
    Line,
    /// Tools behind an MCP server child process, whole-message JSON
    Mcp,
}

impl From<TransportArg> for TransportMode {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Line => TransportMode::Line,
            TransportArg::Mcp => TransportMode::Mcp,
        }
    }
}

/// Inference backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Anthropic,
    Ollama,
}

/// CLI arguments for quill
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about = "Terminal coding agent that reads, lists and edits files")]
#[command(long_about = r#"
quill runs a chat session with a language model that can call three file
tools: read_file, list_files and edit_file. Each turn the model either
answers or asks for tools; results are fed back until it answers.

Configuration files are loaded from (in priority order):
1. QUILL_* environment variables (QUILL_AGENT__MAX_ITERATIONS=8)
2. --config <path>     Explicit config file
3. ./quill.toml        Project-level config
4. ~/.config/quill/config.toml   Global config

Example:
  quill
  quill --transport mcp --provider ollama
  quill -vv --log-dir ./logs --conversation-log trace.jsonl
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Tool transport (overrides [agent] transport)
    #[arg(short, long, value_enum)]
    pub transport: Option<TransportArg>,

    /// Inference backend (overrides [backend] provider)
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Model name for the selected backend
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Stop a turn after this many tool rounds
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Directory relative tool paths resolve against
    #[arg(short = 'C', long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Append a JSONL trace of the conversation to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress tool-call lines and the spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Write diagnostics to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the local file tools over MCP on stdin/stdout
    ServeTools {
        /// Directory relative tool paths resolve against
        #[arg(short = 'C', long, value_name = "DIR")]
        working_dir: Option<PathBuf>,
    },
}
