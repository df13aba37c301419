//! Infrastructure adapters for configuration and the assistant oracle.

/// Process configuration read once at startup.
pub mod config;
pub mod oracle;
