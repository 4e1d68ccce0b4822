//! Conversation entity <-> model mapper

use huddle_core::entities::Conversation;
use huddle_core::value_objects::Snowflake;

use crate::models::ConversationModel;

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            is_group: model.is_group,
            name: model.name,
            last_message: model.last_message,
            last_message_at: model.last_message_at,
            last_message_id: model.last_message_id.map(Snowflake::new),
            created_at: model.created_at,
        }
    }
}

/// Column values for inserting a conversation
pub struct ConversationInsert<'a> {
    pub id: i64,
    pub is_group: bool,
    pub name: Option<&'a str>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> ConversationInsert<'a> {
    pub fn new(conversation: &'a Conversation) -> Self {
        Self {
            id: conversation.id.into_inner(),
            is_group: conversation.is_group,
            name: conversation.name.as_deref(),
            created_at: conversation.created_at,
        }
    }
}
