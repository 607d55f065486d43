//! Conversation domain module
//!
//! A [`Conversation`] is the ordered sequence of [`Turn`]s exchanged between
//! the user, the model and tool results. Insertion order is the model's
//! context, so the type only ever appends.

pub mod entities;

pub use entities::{Conversation, Role, Turn};
