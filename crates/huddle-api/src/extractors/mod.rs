//! Axum extractors for request handling
//!
//! Custom extractors for authentication, path ids and validated bodies.

mod auth;
mod path;
mod validated;

pub use auth::{AuthUser, CurrentUser};
pub use path::{ConversationIdPath, MessageIdPath};
pub use validated::{JsonBody, ValidatedJson};
