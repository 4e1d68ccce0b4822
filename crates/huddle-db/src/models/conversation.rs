//! Conversation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub is_group: bool,
    pub name: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
