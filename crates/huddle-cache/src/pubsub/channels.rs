//! Pub/Sub channel definitions.
//!
//! Defines the channel naming conventions for Redis Pub/Sub.

use huddle_core::Snowflake;

/// Channel prefix for conversation events
pub const CONVERSATION_CHANNEL_PREFIX: &str = "conversation:";
/// Channel prefix for user-specific events
pub const USER_CHANNEL_PREFIX: &str = "user:";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events for one conversation (all members)
    Conversation(Snowflake),
    /// Events for a specific user (conversation list, directory)
    User(Snowflake),
    /// Custom channel name
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn conversation(conversation_id: Snowflake) -> Self {
        Self::Conversation(conversation_id)
    }

    #[must_use]
    pub fn user(user_id: Snowflake) -> Self {
        Self::User(user_id)
    }

    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Conversation(id) => format!("{CONVERSATION_CHANNEL_PREFIX}{id}"),
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if let Some(id) = name
            .strip_prefix(CONVERSATION_CHANNEL_PREFIX)
            .and_then(|s| s.parse::<i64>().ok())
        {
            return Self::Conversation(Snowflake::from(id));
        }

        if let Some(id) = name
            .strip_prefix(USER_CHANNEL_PREFIX)
            .and_then(|s| s.parse::<i64>().ok())
        {
            return Self::User(Snowflake::from(id));
        }

        Self::Custom(name.to_string())
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
