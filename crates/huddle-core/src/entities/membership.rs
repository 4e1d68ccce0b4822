//! Membership - join record between a user and a conversation
//!
//! Carries the per-user read high-water mark and the typing lease.

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    /// Messages created after this instant are unread; `None` means never read
    pub last_seen_at: Option<DateTime<Utc>>,
    /// Typing lease expiry; the user is typing while `now < typing_until`
    pub typing_until: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(conversation_id: Snowflake, user_id: Snowflake, now: DateTime<Utc>) -> Self {
        Self {
            conversation_id,
            user_id,
            last_seen_at: None,
            typing_until: None,
            joined_at: now,
        }
    }

    /// Advance the read mark to `now`; it never moves backwards
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let seen = self.last_seen_at.map_or(now, |current| current.max(now));
        self.last_seen_at = Some(seen);
        seen
    }

    /// Grant or clear the typing lease
    pub fn set_typing(&mut self, is_typing: bool, now: DateTime<Utc>, lease: Duration) {
        self.typing_until = is_typing.then(|| now + lease);
    }

    /// Read-time interpretation of the lease; no expiry job exists
    #[inline]
    pub fn is_typing_at(&self, now: DateTime<Utc>) -> bool {
        self.typing_until.is_some_and(|until| until > now)
    }

    /// Whether a message created at `created_at` is unread for this member
    #[inline]
    pub fn is_unread(&self, created_at: DateTime<Utc>) -> bool {
        self.last_seen_at.map_or(true, |seen| created_at > seen)
    }
}
