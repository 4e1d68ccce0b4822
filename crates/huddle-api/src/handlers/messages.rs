//! Message handlers
//!
//! Endpoints for message operations and reactions.

use axum::{extract::State, Json};
use huddle_service::dto::{
    EditMessageRequest, IdResponse, MessageResponse, ReactionRequest, ReactionToggleResponse,
    SendMessageRequest,
};
use huddle_service::MessageService;

use crate::extractors::{ConversationIdPath, CurrentUser, JsonBody, MessageIdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Messages of a conversation, oldest first
///
/// GET /conversations/{conversation_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    user: CurrentUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let messages = service.list_messages(conversation_id, user.user_id).await?;
    Ok(Json(messages))
}

/// Send message
///
/// POST /conversations/{conversation_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
    JsonBody(request): JsonBody<SendMessageRequest>,
) -> ApiResult<Created<Json<IdResponse>>> {
    let service = MessageService::new(state.service_context());
    let id = service
        .send_message(conversation_id, user.user_id, &request.content)
        .await?;
    Ok(Created(Json(IdResponse::new(id))))
}

/// Edit message (sender only)
///
/// PATCH /messages/{message_id}
pub async fn edit_message(
    State(state): State<AppState>,
    user: CurrentUser,
    MessageIdPath(message_id): MessageIdPath,
    JsonBody(request): JsonBody<EditMessageRequest>,
) -> ApiResult<NoContent> {
    let service = MessageService::new(state.service_context());
    service
        .edit_message(message_id, user.user_id, &request.content)
        .await?;
    Ok(NoContent)
}

/// Delete message (sender only)
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    user: CurrentUser,
    MessageIdPath(message_id): MessageIdPath,
) -> ApiResult<NoContent> {
    let service = MessageService::new(state.service_context());
    service.delete_message(message_id, user.user_id).await?;
    Ok(NoContent)
}

/// Toggle the caller's reaction
///
/// POST /messages/{message_id}/reactions
pub async fn toggle_reaction(
    State(state): State<AppState>,
    user: CurrentUser,
    MessageIdPath(message_id): MessageIdPath,
    ValidatedJson(request): ValidatedJson<ReactionRequest>,
) -> ApiResult<Json<ReactionToggleResponse>> {
    let service = MessageService::new(state.service_context());
    let active = service
        .toggle_reaction(message_id, user.user_id, &request.emoji)
        .await?;
    Ok(Json(ReactionToggleResponse { active }))
}
