//! Reaction - one user's emoji on one message

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub user_id: Snowflake,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(user_id: Snowflake, emoji: String, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            emoji,
            created_at,
        }
    }

    /// Whether this reaction is the `(user, emoji)` pair
    #[inline]
    pub fn matches(&self, user_id: Snowflake, emoji: &str) -> bool {
        self.user_id == user_id && self.emoji == emoji
    }
}
