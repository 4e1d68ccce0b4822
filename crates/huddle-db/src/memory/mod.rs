//! In-memory store
//!
//! Implements every repository trait over a single `RwLock`-guarded table
//! set. Each trait method takes the write lock once, which makes it one
//! atomic unit just like a PostgreSQL transaction. Used for local runs
//! (`DATABASE_URL=memory://`) and as the backend of the service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use huddle_core::entities::{Conversation, Membership, Message, User, UserProfile};
use huddle_core::error::DomainError;
use huddle_core::traits::{
    ConversationRepository, MembershipRepository, MessageRepository, RepoResult, UserRepository,
};
use huddle_core::value_objects::{PresenceState, Snowflake};

#[derive(Default)]
struct Tables {
    users: HashMap<Snowflake, User>,
    users_by_auth_id: HashMap<String, Snowflake>,
    conversations: HashMap<Snowflake, Conversation>,
    memberships: HashMap<(Snowflake, Snowflake), Membership>,
    messages: HashMap<Snowflake, Message>,
}

impl Tables {
    fn direct_between(
        &self,
        user_id: Snowflake,
        participant_id: Snowflake,
    ) -> Option<&Conversation> {
        let mut candidates: Vec<&Conversation> = self
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter(|m| {
                self.memberships
                    .contains_key(&(m.conversation_id, participant_id))
            })
            .filter_map(|m| self.conversations.get(&m.conversation_id))
            .filter(|c| !c.is_group)
            .collect();
        candidates.sort_by_key(|c| c.id);
        candidates.into_iter().next()
    }

    fn message_mut(&mut self, id: Snowflake) -> Result<&mut Message, DomainError> {
        self.messages
            .get_mut(&id)
            .ok_or(DomainError::MessageNotFound(id))
    }

    fn membership_mut(
        &mut self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<&mut Membership, DomainError> {
        self.memberships
            .get_mut(&(conversation_id, user_id))
            .ok_or(DomainError::NotMember(conversation_id))
    }
}

/// Process-local implementation of all repository traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.inner.read();
        f.debug_struct("MemoryStore")
            .field("users", &tables.users.len())
            .field("conversations", &tables.conversations.len())
            .field("messages", &tables.messages.len())
            .finish()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.inner.read().users.get(&id).cloned())
    }

    async fn find_by_auth_id(&self, auth_id: &str) -> RepoResult<Option<User>> {
        let tables = self.inner.read();
        Ok(tables
            .users_by_auth_id
            .get(auth_id)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let tables = self.inner.read();
        let mut users: Vec<User> = ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect();
        users.sort_by_key(|u| u.id);
        users.dedup_by_key(|u| u.id);
        Ok(users)
    }

    #[instrument(skip(self, candidate), fields(auth_id = %candidate.auth_id))]
    async fn upsert(&self, candidate: &User) -> RepoResult<(User, bool)> {
        let mut tables = self.inner.write();

        if let Some(id) = tables.users_by_auth_id.get(&candidate.auth_id).copied() {
            let user = tables
                .users
                .get_mut(&id)
                .ok_or_else(|| {
                    DomainError::InternalError(format!("dangling auth index for {id}"))
                })?;
            user.apply_profile(&UserProfile::from(candidate), candidate.updated_at);
            return Ok((user.clone(), false));
        }

        tables
            .users_by_auth_id
            .insert(candidate.auth_id.clone(), candidate.id);
        tables.users.insert(candidate.id, candidate.clone());
        Ok((candidate.clone(), true))
    }

    async fn transition_presence(
        &self,
        auth_id: &str,
        connect: bool,
        now: DateTime<Utc>,
    ) -> RepoResult<(User, PresenceState)> {
        let mut tables = self.inner.write();
        let id = tables
            .users_by_auth_id
            .get(auth_id)
            .copied()
            .ok_or(DomainError::UserNotSynced)?;
        let user = tables.users.get_mut(&id).ok_or(DomainError::UserNotSynced)?;
        let previous = user.presence;
        user.presence = if connect {
            previous.heartbeat(now)
        } else {
            previous.disconnect()
        };
        user.updated_at = now;
        Ok((user.clone(), previous))
    }

    async fn list_excluding(&self, auth_id: &str) -> RepoResult<Vec<User>> {
        let tables = self.inner.read();
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.auth_id != auth_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        Ok(self.inner.read().conversations.get(&id).cloned())
    }

    #[instrument(skip(self, candidate))]
    async fn find_or_create_direct(
        &self,
        candidate: &Conversation,
        user_id: Snowflake,
        participant_id: Snowflake,
    ) -> RepoResult<(Conversation, bool)> {
        let mut tables = self.inner.write();

        if let Some(existing) = tables.direct_between(user_id, participant_id) {
            return Ok((existing.clone(), false));
        }
        if !tables.users.contains_key(&participant_id) {
            return Err(DomainError::UserNotFound(participant_id));
        }

        let id = candidate.id;
        tables.conversations.insert(id, candidate.clone());
        for member in [user_id, participant_id] {
            tables
                .memberships
                .insert((id, member), Membership::new(id, member, candidate.created_at));
        }

        debug!(conversation_id = %id, "Direct conversation created");
        Ok((candidate.clone(), true))
    }

    async fn create_group(
        &self,
        conversation: &Conversation,
        member_ids: &[Snowflake],
    ) -> RepoResult<()> {
        let mut tables = self.inner.write();

        if let Some(missing) = member_ids.iter().find(|id| !tables.users.contains_key(*id)) {
            return Err(DomainError::UserNotFound(*missing));
        }
        if tables.conversations.contains_key(&conversation.id) {
            return Err(DomainError::Conflict(format!(
                "conversation {} already exists",
                conversation.id
            )));
        }

        let id = conversation.id;
        tables.conversations.insert(id, conversation.clone());
        for &member in member_ids {
            tables
                .memberships
                .entry((id, member))
                .or_insert_with(|| Membership::new(id, member, conversation.created_at));
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn find(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Membership>> {
        Ok(self
            .inner
            .read()
            .memberships
            .get(&(conversation_id, user_id))
            .cloned())
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Membership>> {
        let mut found: Vec<Membership> = self
            .inner
            .read()
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.conversation_id);
        Ok(found)
    }

    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
    ) -> RepoResult<Vec<Membership>> {
        let mut found: Vec<Membership> = self
            .inner
            .read()
            .memberships
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| (m.joined_at, m.user_id));
        Ok(found)
    }

    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<DateTime<Utc>> {
        let mut tables = self.inner.write();
        Ok(tables.membership_mut(conversation_id, user_id)?.mark_read(at))
    }

    async fn set_typing_until(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        until: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        let mut tables = self.inner.write();
        tables.membership_mut(conversation_id, user_id)?.typing_until = until;
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.inner.read().messages.get(&id).cloned())
    }

    async fn find_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>> {
        let mut found: Vec<Message> = self
            .inner
            .read()
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| (m.created_at, m.id));
        Ok(found)
    }

    async fn count_since(
        &self,
        conversation_id: Snowflake,
        since: Option<DateTime<Utc>>,
    ) -> RepoResult<i64> {
        let count = self
            .inner
            .read()
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .filter(|m| since.map_or(true, |seen| m.created_at > seen))
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn append(&self, message: &Message) -> RepoResult<()> {
        let mut tables = self.inner.write();

        if tables.messages.contains_key(&message.id) {
            return Err(DomainError::Conflict(format!(
                "message {} already exists",
                message.id
            )));
        }
        let conversation = tables
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or(DomainError::ConversationNotFound(message.conversation_id))?;

        conversation.record_message(message);
        tables.messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn update_content(
        &self,
        id: Snowflake,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<Message> {
        let mut tables = self.inner.write();

        let message = tables.message_mut(id)?;
        message.edit(content.to_string(), edited_at)?;
        let message = message.clone();

        if let Some(conversation) = tables.conversations.get_mut(&message.conversation_id) {
            conversation.refresh_preview(&message);
        }
        Ok(message)
    }

    async fn soft_delete(&self, id: Snowflake) -> RepoResult<Message> {
        let mut tables = self.inner.write();

        let message = tables.message_mut(id)?;
        let changed = message.soft_delete();
        let message = message.clone();

        if changed {
            if let Some(conversation) = tables.conversations.get_mut(&message.conversation_id) {
                conversation.refresh_preview(&message);
            }
        }
        Ok(message)
    }

    async fn toggle_reaction(
        &self,
        id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut tables = self.inner.write();
        tables.message_mut(id)?.toggle_reaction(user_id, emoji, now)
    }
}
