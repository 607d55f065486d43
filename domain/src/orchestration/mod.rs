//! Orchestration domain
//!
//! States and execution settings of the tool-invocation loop. The loop
//! itself lives in the application layer; this module only names the
//! states it moves through and the knobs that shape it.

pub mod state;

pub use state::{ExecutionMode, LoopState};
