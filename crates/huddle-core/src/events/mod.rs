//! Domain events

mod domain_event;

pub use domain_event::{
    ConversationCreatedEvent, ConversationReadEvent, DomainEvent, MessageEvent,
    PresenceChangedEvent, ReactionToggledEvent, TypingChangedEvent, UserUpsertedEvent,
};
