//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod conversations;
pub mod health;
pub mod messages;
pub mod users;
