//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in huddle-core.
//! Each repository handles database operations for a specific domain entity.

mod conversation;
mod error;
mod membership;
mod message;
mod user;

pub use conversation::PgConversationRepository;
pub use membership::PgMembershipRepository;
pub use message::PgMessageRepository;
pub use user::PgUserRepository;
