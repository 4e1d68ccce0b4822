//! Domain events - emitted after a mutation commits
//!
//! Events are published to the change-notification bus so an external
//! real-time transport can refresh subscribed clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// All possible domain events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    UserUpserted(UserUpsertedEvent),
    PresenceChanged(PresenceChangedEvent),

    ConversationCreated(ConversationCreatedEvent),
    ConversationRead(ConversationReadEvent),
    TypingChanged(TypingChangedEvent),

    MessageCreated(MessageEvent),
    MessageUpdated(MessageEvent),
    MessageDeleted(MessageEvent),
    ReactionToggled(ReactionToggledEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::UserUpserted(_) => "USER_UPSERTED",
            Self::PresenceChanged(_) => "PRESENCE_CHANGED",
            Self::ConversationCreated(_) => "CONVERSATION_CREATED",
            Self::ConversationRead(_) => "CONVERSATION_READ",
            Self::TypingChanged(_) => "TYPING_CHANGED",
            Self::MessageCreated(_) => "MESSAGE_CREATED",
            Self::MessageUpdated(_) => "MESSAGE_UPDATED",
            Self::MessageDeleted(_) => "MESSAGE_DELETED",
            Self::ReactionToggled(_) => "REACTION_TOGGLED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::UserUpserted(e) => e.timestamp,
            Self::PresenceChanged(e) => e.timestamp,
            Self::ConversationCreated(e) => e.timestamp,
            Self::ConversationRead(e) => e.timestamp,
            Self::TypingChanged(e) => e.timestamp,
            Self::MessageCreated(e) | Self::MessageUpdated(e) | Self::MessageDeleted(e) => {
                e.timestamp
            }
            Self::ReactionToggled(e) => e.timestamp,
        }
    }

    /// Conversation whose subscribers should refresh, if any
    pub fn conversation_id(&self) -> Option<Snowflake> {
        match self {
            Self::UserUpserted(_) | Self::PresenceChanged(_) => None,
            Self::ConversationCreated(e) => Some(e.conversation_id),
            Self::ConversationRead(e) => Some(e.conversation_id),
            Self::TypingChanged(e) => Some(e.conversation_id),
            Self::MessageCreated(e) | Self::MessageUpdated(e) | Self::MessageDeleted(e) => {
                Some(e.conversation_id)
            }
            Self::ReactionToggled(e) => Some(e.conversation_id),
        }
    }

    /// Users whose personal feeds (conversation list, directory) change
    pub fn user_ids(&self) -> Vec<Snowflake> {
        match self {
            Self::UserUpserted(e) => vec![e.user_id],
            Self::PresenceChanged(e) => vec![e.user_id],
            Self::ConversationCreated(e) => e.member_ids.clone(),
            Self::ConversationRead(e) => vec![e.user_id],
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpsertedEvent {
    pub user_id: Snowflake,
    pub created: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceChangedEvent {
    pub user_id: Snowflake,
    pub is_online: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationCreatedEvent {
    pub conversation_id: Snowflake,
    pub is_group: bool,
    pub member_ids: Vec<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationReadEvent {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub last_seen_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingChangedEvent {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub typing_until: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub message_id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionToggledEvent {
    pub message_id: Snowflake,
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub active: bool,
    pub timestamp: DateTime<Utc>,
}
