//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Domain rules that depend on trimming or configuration (group names,
//! message length) are enforced again by the services.

use huddle_core::Snowflake;
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// User Requests
// ============================================================================

/// Profile sent on every session start
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SyncUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url: Option<String>,
}

/// Presence change (true = connect / heartbeat, false = disconnect)
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceRequest {
    pub is_online: bool,
}

// ============================================================================
// Conversation Requests
// ============================================================================

/// Open (or reopen) the direct conversation with a user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDirectConversationRequest {
    pub participant_id: Snowflake,
}

/// Create group conversation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "A group needs at least one member"))]
    pub member_ids: Vec<Snowflake>,
}

/// Typing pulse
#[derive(Debug, Clone, Deserialize)]
pub struct TypingRequest {
    pub is_typing: bool,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Send message request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "Message content cannot be empty"))]
    pub content: String,
}

/// Edit message request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditMessageRequest {
    #[validate(length(min = 1, message = "Message content cannot be empty"))]
    pub content: String,
}

/// Toggle reaction request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReactionRequest {
    #[validate(length(min = 1, max = 32, message = "Emoji must be 1-32 characters"))]
    pub emoji: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_user_request_validation() {
        let valid = SyncUserRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar_url: Some("https://img.example.com/ada.png".to_string()),
        };
        assert!(valid.validate().is_ok());

        let bad_email = SyncUserRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let bad_avatar = SyncUserRequest {
            avatar_url: Some("no scheme".to_string()),
            ..valid
        };
        assert!(bad_avatar.validate().is_err());
    }

    #[test]
    fn test_create_group_request_validation() {
        let json = r#"{"name": "Team", "member_ids": ["1001", 1002]}"#;
        let request: CreateGroupRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.member_ids, vec![Snowflake::new(1001), Snowflake::new(1002)]);

        let empty = CreateGroupRequest {
            name: "Team".to_string(),
            member_ids: vec![],
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_reaction_request_validation() {
        assert!(ReactionRequest { emoji: "👍".to_string() }.validate().is_ok());
        assert!(ReactionRequest { emoji: String::new() }.validate().is_err());
    }

    #[test]
    fn test_participant_id_must_be_snowflake() {
        let result: Result<CreateDirectConversationRequest, _> =
            serde_json::from_str(r#"{"participant_id": "abc"}"#);
        assert!(result.is_err());
    }
}
