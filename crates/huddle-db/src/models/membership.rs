//! Membership database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversation_members table
#[derive(Debug, Clone, FromRow)]
pub struct MembershipModel {
    pub conversation_id: i64,
    pub user_id: i64,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub typing_until: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}
