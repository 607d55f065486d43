//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface for quill.

mod repl;

pub use repl::ChatRepl;
