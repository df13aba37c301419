use std::fmt;

use time::OffsetDateTime;

/// Author of one transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Model,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Model => write!(f, "model"),
        }
    }
}

/// One immutable transcript entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub text: String,
    /// Creation instant, used for ordering and display only.
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    /// Creates a message stamped with the current UTC time.
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}
