//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.
//! Presence is evaluated at read time, so user snapshots go through
//! [`UserWithPresence`] which carries the instant and the timeout.

use chrono::{DateTime, Duration, Utc};
use huddle_core::entities::{Message, Reaction, User};

use super::responses::{
    CurrentUserResponse, MessageResponse, ReactionResponse, UserSummaryResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

/// User plus the parameters needed to evaluate its presence
pub struct UserWithPresence<'a> {
    pub user: &'a User,
    pub now: DateTime<Utc>,
    pub timeout: Duration,
}

impl From<UserWithPresence<'_>> for UserSummaryResponse {
    fn from(data: UserWithPresence<'_>) -> Self {
        let user = data.user;
        Self {
            id: user.id.to_string(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            is_online: user.is_online_at(data.now, data.timeout),
            last_seen_at: user.presence.last_seen(),
        }
    }
}

impl From<UserWithPresence<'_>> for CurrentUserResponse {
    fn from(data: UserWithPresence<'_>) -> Self {
        let user = data.user;
        Self {
            id: user.id.to_string(),
            auth_id: user.auth_id.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            is_online: user.is_online_at(data.now, data.timeout),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Reaction> for ReactionResponse {
    fn from(reaction: &Reaction) -> Self {
        Self {
            emoji: reaction.emoji.clone(),
            user_id: reaction.user_id.to_string(),
        }
    }
}

/// Message together with its sender, if still known
pub struct MessageWithSender<'a> {
    pub message: Message,
    pub sender: Option<&'a User>,
}

impl From<MessageWithSender<'_>> for MessageResponse {
    fn from(data: MessageWithSender<'_>) -> Self {
        let message = data.message;
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id.to_string(),
            sender_name: data.sender.map(|u| u.display_name.clone()),
            sender_avatar_url: data.sender.and_then(|u| u.avatar_url.clone()),
            reactions: message.reactions.iter().map(ReactionResponse::from).collect(),
            content: message.content,
            created_at: message.created_at,
            deleted: message.deleted,
            is_edited: message.is_edited,
            edited_at: message.edited_at,
        }
    }
}
