//! Message service
//!
//! Handles message listing, sending, editing, deletion and reactions.

use std::collections::HashMap;

use huddle_core::entities::{validate_content, Message};
use huddle_core::events::{DomainEvent, MessageEvent, ReactionToggledEvent};
use huddle_core::{DomainError, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{MessageResponse, MessageWithSender};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fails with `NotMember` unless the user belongs to the conversation
    async fn require_member(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        self.ctx
            .membership_repo()
            .find(conversation_id, user_id)
            .await?
            .ok_or(DomainError::NotMember(conversation_id))?;
        Ok(())
    }

    async fn find_message(&self, message_id: Snowflake) -> ServiceResult<Message> {
        Ok(self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?)
    }

    /// Messages of a conversation, oldest first, with sender display data
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        conversation_id: Snowflake,
        requester_id: Snowflake,
    ) -> ServiceResult<Vec<MessageResponse>> {
        self.require_member(conversation_id, requester_id).await?;

        let messages = self
            .ctx
            .message_repo()
            .find_by_conversation(conversation_id)
            .await?;

        let mut sender_ids: Vec<Snowflake> = messages.iter().map(|m| m.sender_id).collect();
        sender_ids.sort_unstable();
        sender_ids.dedup();
        let senders: HashMap<Snowflake, _> = self
            .ctx
            .user_repo()
            .find_by_ids(&sender_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(messages
            .into_iter()
            .map(|message| {
                let sender = senders.get(&message.sender_id);
                MessageResponse::from(MessageWithSender { message, sender })
            })
            .collect())
    }

    /// Send a message and make it the conversation preview
    #[instrument(skip(self, content))]
    pub async fn send_message(
        &self,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        content: &str,
    ) -> ServiceResult<Snowflake> {
        let content = validate_content(content, self.ctx.settings().max_message_length)?;
        self.require_member(conversation_id, sender_id).await?;

        let message = Message::new(
            self.ctx.generate_id(),
            conversation_id,
            sender_id,
            content,
            self.ctx.now(),
        );
        self.ctx.message_repo().append(&message).await?;

        info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            sender_id = %sender_id,
            "Message sent"
        );

        self.ctx
            .publish(DomainEvent::MessageCreated(MessageEvent {
                message_id: message.id,
                conversation_id,
                sender_id,
                timestamp: message.created_at,
            }))
            .await;

        Ok(message.id)
    }

    /// Edit a message (sender only)
    #[instrument(skip(self, content))]
    pub async fn edit_message(
        &self,
        message_id: Snowflake,
        requester_id: Snowflake,
        content: &str,
    ) -> ServiceResult<()> {
        let content = validate_content(content, self.ctx.settings().max_message_length)?;

        let message = self.find_message(message_id).await?;
        if !message.is_sent_by(requester_id) {
            return Err(DomainError::NotMessageAuthor.into());
        }
        if message.deleted {
            return Err(DomainError::MessageDeleted(message_id).into());
        }

        let now = self.ctx.now();
        let message = self
            .ctx
            .message_repo()
            .update_content(message_id, &content, now)
            .await?;

        info!(message_id = %message_id, "Message edited");

        self.ctx
            .publish(DomainEvent::MessageUpdated(MessageEvent {
                message_id,
                conversation_id: message.conversation_id,
                sender_id: message.sender_id,
                timestamp: now,
            }))
            .await;

        Ok(())
    }

    /// Soft delete a message (sender only); deleting twice succeeds
    #[instrument(skip(self))]
    pub async fn delete_message(
        &self,
        message_id: Snowflake,
        requester_id: Snowflake,
    ) -> ServiceResult<()> {
        let message = self.find_message(message_id).await?;
        if !message.is_sent_by(requester_id) {
            return Err(DomainError::NotMessageAuthor.into());
        }
        if message.deleted {
            debug!(message_id = %message_id, "Message already deleted");
            return Ok(());
        }

        self.ctx.message_repo().soft_delete(message_id).await?;

        info!(message_id = %message_id, "Message deleted");

        self.ctx
            .publish(DomainEvent::MessageDeleted(MessageEvent {
                message_id,
                conversation_id: message.conversation_id,
                sender_id: message.sender_id,
                timestamp: self.ctx.now(),
            }))
            .await;

        Ok(())
    }

    /// Add the user's emoji reaction, or remove it when present.
    /// Returns whether the reaction is present afterwards.
    #[instrument(skip(self))]
    pub async fn toggle_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> ServiceResult<bool> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(DomainError::ValidationError("Emoji cannot be empty".to_string()).into());
        }

        let message = self.find_message(message_id).await?;
        self.require_member(message.conversation_id, user_id).await?;

        let now = self.ctx.now();
        let active = self
            .ctx
            .message_repo()
            .toggle_reaction(message_id, user_id, emoji, now)
            .await?;

        debug!(message_id = %message_id, user_id = %user_id, emoji, active, "Reaction toggled");

        self.ctx
            .publish(DomainEvent::ReactionToggled(ReactionToggledEvent {
                message_id,
                conversation_id: message.conversation_id,
                user_id,
                emoji: emoji.to_string(),
                active,
                timestamp: now,
            }))
            .await;

        Ok(active)
    }
}
