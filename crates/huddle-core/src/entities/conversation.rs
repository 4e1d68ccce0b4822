//! Conversation entity - a direct (two-person) or group conversation

use chrono::{DateTime, Utc};

use super::Message;
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Conversation metadata with a denormalized preview of the latest message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Snowflake,
    pub is_group: bool,
    /// Present iff `is_group`
    pub name: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new_direct(id: Snowflake, now: DateTime<Utc>) -> Self {
        Self {
            id,
            is_group: false,
            name: None,
            last_message: None,
            last_message_at: None,
            last_message_id: None,
            created_at: now,
        }
    }

    /// Create a group; the name is trimmed and must not be empty
    pub fn new_group(id: Snowflake, name: &str, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Group name cannot be empty"));
        }
        Ok(Self {
            is_group: true,
            name: Some(name.to_string()),
            ..Self::new_direct(id, now)
        })
    }

    /// Point the preview at `message` (last write wins)
    pub fn record_message(&mut self, message: &Message) {
        self.last_message = Some(message.content.clone());
        self.last_message_at = Some(message.created_at);
        self.last_message_id = Some(message.id);
    }

    /// Refresh the preview text if `message` is the one it shows
    pub fn refresh_preview(&mut self, message: &Message) -> bool {
        if self.shows(message.id) {
            self.last_message = Some(message.content.clone());
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn shows(&self, message_id: Snowflake) -> bool {
        self.last_message_id == Some(message_id)
    }

    /// Ordering key for conversation lists; never-messaged conversations sort last
    pub fn activity_key(&self) -> DateTime<Utc> {
        self.last_message_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}
