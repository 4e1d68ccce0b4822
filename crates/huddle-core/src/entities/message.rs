//! Message entity - one entry of a conversation's append-mostly log

use chrono::{DateTime, Utc};

use super::Reaction;
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Content stored in place of a soft-deleted message
pub const DELETED_MESSAGE_PLACEHOLDER: &str = "This message was deleted";

/// Message entity
///
/// Once `deleted` is set the content is the placeholder, reactions are gone
/// and every further edit or reaction is rejected with
/// [`DomainError::MessageDeleted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub reactions: Vec<Reaction>,
}

impl Message {
    pub fn new(
        id: Snowflake,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            content,
            created_at,
            deleted: false,
            is_edited: false,
            edited_at: None,
            reactions: Vec::new(),
        }
    }

    #[inline]
    pub fn is_sent_by(&self, user_id: Snowflake) -> bool {
        self.sender_id == user_id
    }

    fn ensure_live(&self) -> Result<(), DomainError> {
        if self.deleted {
            return Err(DomainError::MessageDeleted(self.id));
        }
        Ok(())
    }

    /// Replace the content and flag the message as edited
    pub fn edit(&mut self, content: String, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_live()?;
        self.content = content;
        self.is_edited = true;
        self.edited_at = Some(now);
        Ok(())
    }

    /// Soft delete. Returns `false` when the message was already deleted.
    pub fn soft_delete(&mut self) -> bool {
        if self.deleted {
            return false;
        }
        self.content = DELETED_MESSAGE_PLACEHOLDER.to_string();
        self.deleted = true;
        self.reactions.clear();
        true
    }

    /// Add the `(user, emoji)` reaction, or remove it when present.
    /// Returns whether the reaction is present afterwards.
    pub fn toggle_reaction(
        &mut self,
        user_id: Snowflake,
        emoji: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.ensure_live()?;
        if let Some(index) = self.reactions.iter().position(|r| r.matches(user_id, emoji)) {
            self.reactions.remove(index);
            Ok(false)
        } else {
            self.reactions
                .push(Reaction::new(user_id, emoji.to_string(), now));
            Ok(true)
        }
    }

    pub fn has_reaction(&self, user_id: Snowflake, emoji: &str) -> bool {
        self.reactions.iter().any(|r| r.matches(user_id, emoji))
    }
}

/// Trim-check message content and enforce the length limit (in characters)
pub fn validate_content(content: &str, max_len: usize) -> Result<String, DomainError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("Message content cannot be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::ContentTooLong { max: max_len });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::new(
            Snowflake::new(10),
            Snowflake::new(1),
            Snowflake::new(100),
            "hi".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_message_is_live() {
        let msg = message();
        assert!(!msg.deleted);
        assert!(!msg.is_edited);
        assert!(msg.reactions.is_empty());
        assert!(msg.is_sent_by(Snowflake::new(100)));
    }

    #[test]
    fn test_edit_sets_flag() {
        let mut msg = message();
        let now = Utc::now();
        msg.edit("hello".to_string(), now).unwrap();
        assert_eq!(msg.content, "hello");
        assert!(msg.is_edited);
        assert_eq!(msg.edited_at, Some(now));
    }

    #[test]
    fn test_toggle_reaction_twice_restores() {
        let mut msg = message();
        let user = Snowflake::new(200);

        assert!(msg.toggle_reaction(user, "👍", Utc::now()).unwrap());
        assert!(msg.has_reaction(user, "👍"));
        assert_eq!(msg.reactions.len(), 1);

        assert!(!msg.toggle_reaction(user, "👍", Utc::now()).unwrap());
        assert!(msg.reactions.is_empty());
    }

    #[test]
    fn test_distinct_emoji_coexist() {
        let mut msg = message();
        let user = Snowflake::new(200);
        msg.toggle_reaction(user, "👍", Utc::now()).unwrap();
        msg.toggle_reaction(user, "🎉", Utc::now()).unwrap();
        msg.toggle_reaction(Snowflake::new(300), "👍", Utc::now()).unwrap();
        assert_eq!(msg.reactions.len(), 3);
    }

    #[test]
    fn test_soft_delete_freezes_message() {
        let mut msg = message();
        msg.toggle_reaction(Snowflake::new(200), "👍", Utc::now()).unwrap();

        assert!(msg.soft_delete());
        assert_eq!(msg.content, DELETED_MESSAGE_PLACEHOLDER);
        assert!(msg.reactions.is_empty());
        assert!(!msg.soft_delete());

        assert!(matches!(
            msg.edit("again".to_string(), Utc::now()),
            Err(DomainError::MessageDeleted(_))
        ));
        assert!(matches!(
            msg.toggle_reaction(Snowflake::new(200), "👍", Utc::now()),
            Err(DomainError::MessageDeleted(_))
        ));
        assert_eq!(msg.content, DELETED_MESSAGE_PLACEHOLDER);
    }

    #[test]
    fn test_validate_content() {
        assert_eq!(validate_content("  hi  ", 10).unwrap(), "hi");
        assert!(matches!(
            validate_content("   ", 10),
            Err(DomainError::ValidationError(_))
        ));
        assert!(matches!(
            validate_content("ééééé", 4),
            Err(DomainError::ContentTooLong { max: 4 })
        ));
        assert!(validate_content("ééééé", 5).is_ok());
    }
}
