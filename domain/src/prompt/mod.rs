//! Prompt domain
//!
//! Renders the tool catalog, the call grammar and the result format into the
//! instruction block that leads every inference call.

mod assembler;

pub use assembler::{PromptAssembler, RESULT_PREFIX};
