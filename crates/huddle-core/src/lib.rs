//! # huddle-core
//!
//! Domain layer for direct and group conversations: entities, value objects,
//! repository traits, change events and the clock/publisher seams.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    validate_content, Conversation, Membership, Message, Reaction, User, UserProfile,
    DELETED_MESSAGE_PLACEHOLDER,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{
    Clock, ConversationRepository, EventPublisher, ManualClock, MembershipRepository,
    MessageRepository, NoopPublisher, RepoResult, SystemClock, UserRepository,
};
pub use value_objects::{PresenceState, Snowflake, SnowflakeGenerator, SnowflakeParseError};
