//! # huddle-service
//!
//! Application layer: the query/mutation facade over the repositories.
//!
//! Every operation resolves the caller to a user id first (see
//! [`services::UserService::resolve_user`]), checks membership where the
//! conversation is involved, performs one atomic repository mutation and
//! then publishes a change event on a best-effort basis.

pub mod dto;
pub mod services;

pub use services::{
    ChatSettings, ConversationService, MessageService, PresenceService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};
