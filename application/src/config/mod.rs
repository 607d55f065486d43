//! Application-level configuration.
//!
//! - [`ExecutionParams`] — orchestration loop control (iteration guard,
//!   batch execution mode, malformed-call policy)

pub mod execution_params;

pub use execution_params::ExecutionParams;
