//! Request payloads and response shapes used by the integration tests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SyncUser {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl SyncUser {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            avatar_url: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Presence {
    pub is_online: bool,
}

#[derive(Debug, Serialize)]
pub struct DirectConversation<'a> {
    pub participant_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GroupConversation<'a> {
    pub name: &'a str,
    pub member_ids: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct Typing {
    pub is_typing: bool,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Emoji<'a> {
    pub emoji: &'a str,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IdBody {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrentUserBody {
    pub id: String,
    pub auth_id: String,
    pub display_name: String,
    pub email: String,
    pub is_online: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserSummaryBody {
    pub id: String,
    pub display_name: String,
    pub is_online: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConversationSummaryBody {
    pub id: String,
    pub is_group: bool,
    pub name: Option<String>,
    pub other_user: Option<UserSummaryBody>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub member_count: Option<usize>,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ConversationDetailBody {
    pub id: String,
    pub is_group: bool,
    pub name: Option<String>,
    pub other_user: Option<UserSummaryBody>,
    pub is_typing: Option<bool>,
    pub member_count: Option<usize>,
    pub last_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionBody {
    pub emoji: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub content: String,
    pub deleted: bool,
    pub is_edited: bool,
    pub reactions: Vec<ReactionBody>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
