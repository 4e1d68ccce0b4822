//! User entity - a person known through the external identity provider

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::{PresenceState, Snowflake};

/// User directory record, keyed externally by `auth_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub auth_id: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub presence: PresenceState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields supplied by the identity provider on session sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub auth_id: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            auth_id: user.auth_id.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

impl User {
    /// Create a connected user from a synced profile
    pub fn from_profile(id: Snowflake, profile: UserProfile, now: DateTime<Utc>) -> Self {
        Self {
            id,
            auth_id: profile.auth_id,
            display_name: profile.display_name,
            email: profile.email,
            avatar_url: profile.avatar_url,
            presence: PresenceState::connected(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite profile fields from a fresh sync; the sync also counts as a heartbeat
    pub fn apply_profile(&mut self, profile: &UserProfile, now: DateTime<Utc>) {
        self.display_name.clone_from(&profile.display_name);
        self.email.clone_from(&profile.email);
        self.avatar_url.clone_from(&profile.avatar_url);
        self.presence = self.presence.heartbeat(now);
        self.updated_at = now;
    }

    /// Effective presence, honouring the heartbeat timeout
    #[inline]
    pub fn is_online_at(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.presence.is_online_at(now, timeout)
    }
}
