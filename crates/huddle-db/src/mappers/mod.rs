//! Entity to model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database writes

mod conversation;
mod membership;
mod message;
mod user;

pub use conversation::ConversationInsert;
pub use message::{attach_reactions, MessageInsert};
pub use user::UserInsert;
