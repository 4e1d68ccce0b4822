//! Conversation service
//!
//! Direct conversation resolution, group creation, the conversation list,
//! conversation detail, typing pulses and read marks.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use huddle_core::entities::{Conversation, Membership, User};
use huddle_core::events::{
    ConversationCreatedEvent, ConversationReadEvent, DomainEvent, TypingChangedEvent,
};
use huddle_core::{DomainError, Snowflake};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::dto::{
    ConversationDetailResponse, ConversationSummaryResponse, CreateGroupRequest,
    UserSummaryResponse, UserWithPresence,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

/// Who is in a conversation, as seen by one viewer
struct Participants {
    members: Vec<Membership>,
    other: Option<User>,
}

impl<'a> ConversationService<'a> {
    /// Create a new ConversationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Return the direct conversation between two users, creating it on first use
    #[instrument(skip(self))]
    pub async fn resolve_direct(
        &self,
        user_id: Snowflake,
        participant_id: Snowflake,
    ) -> ServiceResult<Snowflake> {
        if user_id == participant_id {
            return Err(DomainError::ValidationError(
                "Cannot open a conversation with yourself".to_string(),
            )
            .into());
        }

        if self.ctx.user_repo().find_by_id(participant_id).await?.is_none() {
            return Err(DomainError::UserNotFound(participant_id).into());
        }

        let candidate = Conversation::new_direct(self.ctx.generate_id(), self.ctx.now());
        let (conversation, created) = self
            .ctx
            .conversation_repo()
            .find_or_create_direct(&candidate, user_id, participant_id)
            .await?;

        if created {
            info!(
                conversation_id = %conversation.id,
                user_id = %user_id,
                participant_id = %participant_id,
                "Direct conversation created"
            );
            self.ctx
                .publish(DomainEvent::ConversationCreated(ConversationCreatedEvent {
                    conversation_id: conversation.id,
                    is_group: false,
                    member_ids: vec![user_id, participant_id],
                    timestamp: conversation.created_at,
                }))
                .await;
        }

        Ok(conversation.id)
    }

    /// Create a group with the creator and the listed users
    #[instrument(skip(self, request))]
    pub async fn create_group(
        &self,
        creator_id: Snowflake,
        request: &CreateGroupRequest,
    ) -> ServiceResult<Snowflake> {
        request.validate()?;

        let conversation =
            Conversation::new_group(self.ctx.generate_id(), &request.name, self.ctx.now())?;

        let member_ids: BTreeSet<Snowflake> = request
            .member_ids
            .iter()
            .copied()
            .chain(std::iter::once(creator_id))
            .collect();
        if member_ids.len() < 2 {
            return Err(DomainError::ValidationError(
                "A group needs at least one other member".to_string(),
            )
            .into());
        }
        let member_ids: Vec<Snowflake> = member_ids.into_iter().collect();

        let found = self.ctx.user_repo().find_by_ids(&member_ids).await?;
        if let Some(missing) = member_ids
            .iter()
            .find(|id| !found.iter().any(|user| user.id == **id))
        {
            return Err(DomainError::UserNotFound(*missing).into());
        }

        self.ctx
            .conversation_repo()
            .create_group(&conversation, &member_ids)
            .await?;

        info!(
            conversation_id = %conversation.id,
            creator_id = %creator_id,
            member_count = member_ids.len(),
            "Group conversation created"
        );

        self.ctx
            .publish(DomainEvent::ConversationCreated(ConversationCreatedEvent {
                conversation_id: conversation.id,
                is_group: true,
                member_ids,
                timestamp: conversation.created_at,
            }))
            .await;

        Ok(conversation.id)
    }

    /// Conversations of a user, most recently active first
    #[instrument(skip(self))]
    pub async fn list_conversations(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ConversationSummaryResponse>> {
        let memberships = self.ctx.membership_repo().find_by_user(user_id).await?;

        let rows = try_join_all(
            memberships
                .iter()
                .map(|membership| self.summarize(membership, user_id)),
        )
        .await?;

        let mut rows: Vec<(DateTime<Utc>, Snowflake, ConversationSummaryResponse)> =
            rows.into_iter().flatten().collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }

    /// One row of the list, keyed for sorting; `None` when the conversation is gone
    async fn summarize(
        &self,
        membership: &Membership,
        user_id: Snowflake,
    ) -> ServiceResult<Option<(DateTime<Utc>, Snowflake, ConversationSummaryResponse)>> {
        let Some(conversation) = self
            .ctx
            .conversation_repo()
            .find_by_id(membership.conversation_id)
            .await?
        else {
            debug!(conversation_id = %membership.conversation_id, "Skipping missing conversation");
            return Ok(None);
        };

        let participants = self.participants(&conversation, Some(user_id)).await?;
        let unread_count = self
            .ctx
            .message_repo()
            .count_since(conversation.id, membership.last_seen_at)
            .await?;

        let row = ConversationSummaryResponse {
            id: conversation.id.to_string(),
            is_group: conversation.is_group,
            other_user: participants.other.as_ref().map(|user| self.user_summary(user)),
            member_count: conversation.is_group.then_some(participants.members.len()),
            unread_count,
            last_message_at: conversation.last_message_at,
            name: conversation.name.clone(),
            last_message: conversation.last_message.clone(),
        };

        Ok(Some((conversation.activity_key(), conversation.id, row)))
    }

    /// Conversation detail. A viewer who is not a member sees `None`, same
    /// as for a conversation that does not exist.
    #[instrument(skip(self))]
    pub async fn get_conversation(
        &self,
        conversation_id: Snowflake,
        viewer_id: Option<Snowflake>,
    ) -> ServiceResult<Option<ConversationDetailResponse>> {
        let Some(conversation) = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
        else {
            return Ok(None);
        };

        let participants = self.participants(&conversation, viewer_id).await?;
        if let Some(viewer_id) = viewer_id {
            if !participants.members.iter().any(|m| m.user_id == viewer_id) {
                return Ok(None);
            }
        }

        let now = self.ctx.now();
        let is_typing = (!conversation.is_group).then(|| {
            participants
                .members
                .iter()
                .filter(|m| Some(m.user_id) != viewer_id)
                .any(|m| m.is_typing_at(now))
        });

        Ok(Some(ConversationDetailResponse {
            id: conversation.id.to_string(),
            is_group: conversation.is_group,
            other_user: participants.other.as_ref().map(|user| self.user_summary(user)),
            is_typing,
            member_count: conversation.is_group.then_some(participants.members.len()),
            name: conversation.name,
            last_message: conversation.last_message,
            last_message_at: conversation.last_message_at,
            created_at: conversation.created_at,
        }))
    }

    /// Send (`true`) or clear (`false`) a typing pulse
    #[instrument(skip(self))]
    pub async fn set_typing(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        is_typing: bool,
    ) -> ServiceResult<()> {
        let now = self.ctx.now();
        let typing_until = is_typing.then(|| now + self.ctx.settings().typing_lease);

        self.ctx
            .membership_repo()
            .set_typing_until(conversation_id, user_id, typing_until)
            .await?;

        self.ctx
            .publish(DomainEvent::TypingChanged(TypingChangedEvent {
                conversation_id,
                user_id,
                typing_until,
                timestamp: now,
            }))
            .await;

        Ok(())
    }

    /// Advance the user's read mark to now; it never moves backwards
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<DateTime<Utc>> {
        let now = self.ctx.now();
        let last_seen_at = self
            .ctx
            .membership_repo()
            .mark_read(conversation_id, user_id, now)
            .await?;

        self.ctx
            .publish(DomainEvent::ConversationRead(ConversationReadEvent {
                conversation_id,
                user_id,
                last_seen_at,
                timestamp: now,
            }))
            .await;

        Ok(last_seen_at)
    }

    /// Members, plus the other participant of a direct conversation
    async fn participants(
        &self,
        conversation: &Conversation,
        viewer_id: Option<Snowflake>,
    ) -> ServiceResult<Participants> {
        let members = self
            .ctx
            .membership_repo()
            .find_by_conversation(conversation.id)
            .await?;

        let other = match (conversation.is_group, viewer_id) {
            (false, Some(viewer_id)) => {
                match members.iter().find(|m| m.user_id != viewer_id) {
                    Some(other) => self.ctx.user_repo().find_by_id(other.user_id).await?,
                    None => None,
                }
            }
            _ => None,
        };

        Ok(Participants { members, other })
    }

    fn user_summary(&self, user: &User) -> UserSummaryResponse {
        UserSummaryResponse::from(UserWithPresence {
            user,
            now: self.ctx.now(),
            timeout: self.ctx.settings().presence_timeout,
        })
    }
}
