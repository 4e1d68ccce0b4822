//! Database models - SQLx-compatible structs for PostgreSQL tables

mod conversation;
mod membership;
mod message;
mod user;

pub use conversation::ConversationModel;
pub use membership::MembershipModel;
pub use message::{MessageModel, ReactionModel};
pub use user::UserModel;
