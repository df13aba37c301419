//! Domain types for the project tree and the chat transcript.

pub mod chat;
pub mod project;
/// Starter Construct 3 project.
pub mod seed;
