//! User entity <-> model mapper

use chrono::{DateTime, Utc};
use huddle_core::entities::User;
use huddle_core::value_objects::{PresenceState, Snowflake};

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            auth_id: model.auth_id,
            display_name: model.display_name,
            email: model.email,
            avatar_url: model.avatar_url,
            presence: PresenceState::from_parts(model.is_online, model.last_heartbeat_at),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Column values for inserting or upserting a user
pub struct UserInsert<'a> {
    pub id: i64,
    pub auth_id: &'a str,
    pub display_name: &'a str,
    pub email: &'a str,
    pub avatar_url: Option<&'a str>,
    pub is_online: bool,
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> UserInsert<'a> {
    pub fn new(user: &'a User) -> Self {
        let (is_online, last_heartbeat_at) = user.presence.into_parts();
        Self {
            id: user.id.into_inner(),
            auth_id: &user.auth_id,
            display_name: &user.display_name,
            email: &user.email,
            avatar_url: user.avatar_url.as_deref(),
            is_online,
            last_heartbeat_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_columns_roundtrip() {
        let now = Utc::now();
        let model = UserModel {
            id: 7,
            auth_id: "user_7".to_string(),
            display_name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            avatar_url: None,
            is_online: true,
            last_heartbeat_at: Some(now),
            created_at: now,
            updated_at: now,
        };
        let user = User::from(model);
        assert_eq!(user.presence, PresenceState::connected(now));

        let insert = UserInsert::new(&user);
        assert!(insert.is_online);
        assert_eq!(insert.last_heartbeat_at, Some(now));
    }
}
