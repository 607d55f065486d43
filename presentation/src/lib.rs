//! Presentation layer for quill
//!
//! This crate contains CLI definitions, console formatting,
//! progress reporters, and the interactive chat prompt.

pub mod chat;

pub mod cli {
    //! Command-line argument definitions
    pub mod commands;
}

pub mod output {
    //! Console rendering of session events
    pub mod console;
}

pub mod progress {
    //! Turn progress notifiers
    pub mod reporter;
}

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, Command, ProviderArg, TransportArg};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
