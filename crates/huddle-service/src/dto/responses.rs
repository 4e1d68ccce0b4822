//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Id of a created or resolved resource
#[derive(Debug, Clone, Serialize)]
pub struct IdResponse {
    pub id: String,
}

impl IdResponse {
    pub fn new(id: impl ToString) -> Self {
        Self { id: id.to_string() }
    }
}

// ============================================================================
// User Responses
// ============================================================================

/// The caller's own user record
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub auth_id: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Directory entry / conversation participant snapshot
#[derive(Debug, Clone, Serialize)]
pub struct UserSummaryResponse {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    /// Effective presence at read time
    pub is_online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Conversation Responses
// ============================================================================

/// Row of the conversation list
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummaryResponse {
    pub id: String,
    pub is_group: bool,
    pub name: Option<String>,
    /// The other participant (direct conversations only)
    pub other_user: Option<UserSummaryResponse>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    /// Number of members (group conversations only)
    pub member_count: Option<usize>,
    pub unread_count: i64,
}

/// Single conversation view
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetailResponse {
    pub id: String,
    pub is_group: bool,
    pub name: Option<String>,
    pub other_user: Option<UserSummaryResponse>,
    /// Whether the other participant holds a live typing lease (direct only)
    pub is_typing: Option<bool>,
    pub member_count: Option<usize>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Message Responses
// ============================================================================

/// Message with its sender's display data
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    /// `None` when the sender record is gone
    pub sender_name: Option<String>,
    pub sender_avatar_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub reactions: Vec<ReactionResponse>,
}

/// One `(emoji, user)` reaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionResponse {
    pub emoji: String,
    pub user_id: String,
}

/// Result of a reaction toggle
#[derive(Debug, Clone, Serialize)]
pub struct ReactionToggleResponse {
    /// Whether the reaction is present after the toggle
    pub active: bool,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub store: String,
    /// `None` when change notifications are disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<String>,
}

fn health_label(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

impl ReadinessResponse {
    pub fn ready(store_healthy: bool, redis_healthy: Option<bool>) -> Self {
        let all_healthy = store_healthy && redis_healthy.unwrap_or(true);
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                store: health_label(store_healthy),
                redis: redis_healthy.map(health_label),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
