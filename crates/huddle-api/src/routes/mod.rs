//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers::{conversations, health, messages, users};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new()
        // API v1 endpoints
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(conversation_routes())
        .merge(message_routes())
}

/// User directory and session routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_other_users))
        .route("/users/@me", get(users::get_current_user))
        .route("/users/@me/sync", post(users::sync_current_user))
        .route("/users/@me/presence", put(users::set_presence))
        .route("/users/@me/heartbeat", post(users::heartbeat))
}

/// Conversation routes
fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations/direct", post(conversations::resolve_direct))
        .route("/conversations/group", post(conversations::create_group))
        .route("/conversations/:conversation_id", get(conversations::get_conversation))
        .route("/conversations/:conversation_id/typing", put(conversations::set_typing))
        .route("/conversations/:conversation_id/read", post(conversations::mark_read))
        // Conversation messages
        .route(
            "/conversations/:conversation_id/messages",
            get(messages::list_messages).post(messages::send_message),
        )
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages/:message_id",
            patch(messages::edit_message).delete(messages::delete_message),
        )
        .route("/messages/:message_id/reactions", post(messages::toggle_reaction))
}
