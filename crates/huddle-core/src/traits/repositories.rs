//! Repository traits (ports) - define the interface for data access
//!
//! Every mutating method is one atomic unit in the implementation: a single
//! database transaction for PostgreSQL, a single write-lock section for the
//! in-memory store. Timestamps are supplied by the caller from its clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Conversation, Membership, Message, User};
use crate::error::DomainError;
use crate::value_objects::{PresenceState, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Directory
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by identity-provider subject
    async fn find_by_auth_id(&self, auth_id: &str) -> RepoResult<Option<User>>;

    /// Find several users at once; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    /// Insert `candidate`, or update the profile and presence of the user
    /// already registered under `candidate.auth_id` (keeping its id).
    /// Returns the stored user and whether it was created.
    async fn upsert(&self, candidate: &User) -> RepoResult<(User, bool)>;

    /// Atomically apply a heartbeat (`connect == true`) or a disconnect.
    /// Returns the stored user and the presence state it replaced;
    /// `UserNotSynced` when the auth id is unknown.
    async fn transition_presence(
        &self,
        auth_id: &str,
        connect: bool,
        now: DateTime<Utc>,
    ) -> RepoResult<(User, PresenceState)>;

    /// Every user except the one registered under `auth_id`, by display name
    async fn list_excluding(&self, auth_id: &str) -> RepoResult<Vec<User>>;
}

// ============================================================================
// Conversation Registry
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// Return the direct conversation between `user_id` and `participant_id`,
    /// or store `candidate` with both memberships when none exists.
    /// Group conversations containing both users never match.
    /// Returns the conversation and whether it was created.
    async fn find_or_create_direct(
        &self,
        candidate: &Conversation,
        user_id: Snowflake,
        participant_id: Snowflake,
    ) -> RepoResult<(Conversation, bool)>;

    /// Store a group conversation together with one membership per member
    async fn create_group(
        &self,
        conversation: &Conversation,
        member_ids: &[Snowflake],
    ) -> RepoResult<()>;
}

// ============================================================================
// Membership Index
// ============================================================================

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Membership>>;

    /// All memberships of a user
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Membership>>;

    /// All memberships of a conversation
    async fn find_by_conversation(&self, conversation_id: Snowflake)
        -> RepoResult<Vec<Membership>>;

    /// Advance the read mark to `max(current, at)` and return the stored value
    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<DateTime<Utc>>;

    /// Set or clear the typing lease
    async fn set_typing_until(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        until: Option<DateTime<Utc>>,
    ) -> RepoResult<()>;
}

// ============================================================================
// Message Store
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID, reactions included
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Messages of a conversation, oldest first
    async fn find_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>>;

    /// Number of messages created strictly after `since` (all when `None`)
    async fn count_since(
        &self,
        conversation_id: Snowflake,
        since: Option<DateTime<Utc>>,
    ) -> RepoResult<i64>;

    /// Insert the message and point the conversation preview at it
    async fn append(&self, message: &Message) -> RepoResult<()>;

    /// Edit content; refreshes the preview when the message is the latest.
    /// Fails with `MessageDeleted` on a deleted message.
    async fn update_content(
        &self,
        id: Snowflake,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<Message>;

    /// Soft delete, dropping reactions; replaces the preview only when the
    /// message is the latest. Deleting twice returns the stored message.
    async fn soft_delete(&self, id: Snowflake) -> RepoResult<Message>;

    /// Toggle the `(user, emoji)` reaction; returns whether it is now present
    async fn toggle_reaction(
        &self,
        id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<bool>;
}
