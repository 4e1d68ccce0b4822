//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    CreateDirectConversationRequest, CreateGroupRequest, EditMessageRequest, PresenceRequest,
    ReactionRequest, SendMessageRequest, SyncUserRequest, TypingRequest,
};

// Re-export commonly used response types
pub use responses::{
    ConversationDetailResponse, ConversationSummaryResponse, CurrentUserResponse, HealthChecks,
    HealthResponse, IdResponse, MessageResponse, ReactionResponse, ReactionToggleResponse,
    ReadinessResponse, UserSummaryResponse,
};

// Re-export mappers and helper structs
pub use mappers::{MessageWithSender, UserWithPresence};
