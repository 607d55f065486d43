//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod transport;
pub mod validation;

pub use transport::TransportMode;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
