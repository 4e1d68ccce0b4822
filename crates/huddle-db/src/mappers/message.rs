//! Message and reaction entity <-> model mapper

use std::collections::HashMap;

use huddle_core::entities::{Message, Reaction};
use huddle_core::value_objects::Snowflake;

use crate::models::{MessageModel, ReactionModel};

impl From<ReactionModel> for Reaction {
    fn from(model: ReactionModel) -> Self {
        Reaction {
            user_id: Snowflake::new(model.user_id),
            emoji: model.emoji,
            created_at: model.created_at,
        }
    }
}

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            conversation_id: Snowflake::new(model.conversation_id),
            sender_id: Snowflake::new(model.sender_id),
            content: model.content,
            created_at: model.created_at,
            deleted: model.deleted,
            is_edited: model.is_edited,
            edited_at: model.edited_at,
            reactions: Vec::new(),
        }
    }
}

/// Build messages, distributing reaction rows onto their message
pub fn attach_reactions(
    messages: Vec<MessageModel>,
    reactions: Vec<ReactionModel>,
) -> Vec<Message> {
    let mut by_message: HashMap<i64, Vec<Reaction>> = HashMap::new();
    for reaction in reactions {
        by_message
            .entry(reaction.message_id)
            .or_default()
            .push(Reaction::from(reaction));
    }

    messages
        .into_iter()
        .map(|model| {
            let reactions = by_message.remove(&model.id).unwrap_or_default();
            Message {
                reactions,
                ..Message::from(model)
            }
        })
        .collect()
}

/// Column values for inserting a message
pub struct MessageInsert<'a> {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: &'a str,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            conversation_id: message.conversation_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            content: &message.content,
            created_at: message.created_at,
        }
    }
}
