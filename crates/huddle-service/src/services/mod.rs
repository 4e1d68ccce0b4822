//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod context;
pub mod conversation;
pub mod error;
pub mod message;
pub mod presence;
pub mod user;

// Re-export all services for convenience
pub use context::{ChatSettings, ServiceContext, ServiceContextBuilder};
pub use conversation::ConversationService;
pub use error::{ServiceError, ServiceResult};
pub use message::MessageService;
pub use presence::PresenceService;
pub use user::UserService;
