//! Conversation handlers
//!
//! Direct/group creation, the conversation list and detail, typing and read marks.

use axum::{extract::State, Json};
use huddle_core::DomainError;
use huddle_service::dto::{
    ConversationDetailResponse, ConversationSummaryResponse, CreateDirectConversationRequest,
    CreateGroupRequest, IdResponse, TypingRequest,
};
use huddle_service::ConversationService;

use crate::extractors::{ConversationIdPath, CurrentUser, JsonBody, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Open the direct conversation with a user (created on first use)
///
/// POST /conversations/direct
pub async fn resolve_direct(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateDirectConversationRequest>,
) -> ApiResult<Json<IdResponse>> {
    let service = ConversationService::new(state.service_context());
    let id = service
        .resolve_direct(user.user_id, request.participant_id)
        .await?;
    Ok(Json(IdResponse::new(id)))
}

/// Create a group conversation
///
/// POST /conversations/group
pub async fn create_group(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(request): JsonBody<CreateGroupRequest>,
) -> ApiResult<Created<Json<IdResponse>>> {
    let service = ConversationService::new(state.service_context());
    let id = service.create_group(user.user_id, &request).await?;
    Ok(Created(Json(IdResponse::new(id))))
}

/// The caller's conversations, most recently active first
///
/// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<ConversationSummaryResponse>>> {
    let service = ConversationService::new(state.service_context());
    let conversations = service.list_conversations(user.user_id).await?;
    Ok(Json(conversations))
}

/// Get a conversation the caller belongs to
///
/// GET /conversations/{conversation_id}
pub async fn get_conversation(
    State(state): State<AppState>,
    user: CurrentUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
) -> ApiResult<Json<ConversationDetailResponse>> {
    let service = ConversationService::new(state.service_context());
    service
        .get_conversation(conversation_id, Some(user.user_id))
        .await?
        .map(Json)
        .ok_or_else(|| DomainError::ConversationNotFound(conversation_id).into())
}

/// Typing pulse
///
/// PUT /conversations/{conversation_id}/typing
pub async fn set_typing(
    State(state): State<AppState>,
    user: CurrentUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
    JsonBody(request): JsonBody<TypingRequest>,
) -> ApiResult<NoContent> {
    let service = ConversationService::new(state.service_context());
    service
        .set_typing(conversation_id, user.user_id, request.is_typing)
        .await?;
    Ok(NoContent)
}

/// Mark the conversation read up to now
///
/// POST /conversations/{conversation_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
) -> ApiResult<NoContent> {
    let service = ConversationService::new(state.service_context());
    service.mark_read(conversation_id, user.user_id).await?;
    Ok(NoContent)
}
