//! Domain entities - core business objects

mod conversation;
mod membership;
mod message;
mod reaction;
mod user;

pub use conversation::Conversation;
pub use membership::Membership;
pub use message::{validate_content, Message, DELETED_MESSAGE_PLACEHOLDER};
pub use reaction::Reaction;
pub use user::{User, UserProfile};
