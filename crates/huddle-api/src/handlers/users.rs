//! User handlers
//!
//! Session sync, presence and the user directory.

use axum::{extract::State, Json};
use huddle_service::dto::{
    CurrentUserResponse, IdResponse, PresenceRequest, SyncUserRequest, UserSummaryResponse,
};
use huddle_service::{PresenceService, UserService};

use crate::extractors::{AuthUser, CurrentUser, JsonBody, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Create or refresh the caller's user record
///
/// POST /users/@me/sync
pub async fn sync_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SyncUserRequest>,
) -> ApiResult<Json<IdResponse>> {
    let service = UserService::new(state.service_context());
    let user_id = service.sync_user(&auth.auth_id, request).await?;
    Ok(Json(IdResponse::new(user_id)))
}

/// Get current user
///
/// GET /users/@me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_current_user(&auth.auth_id).await?;
    Ok(Json(response))
}

/// Every other user, by display name
///
/// GET /users
pub async fn list_other_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<UserSummaryResponse>>> {
    let service = UserService::new(state.service_context());
    let users = service.list_other_users(&user.auth_id).await?;
    Ok(Json(users))
}

/// Connect or disconnect
///
/// PUT /users/@me/presence
pub async fn set_presence(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<PresenceRequest>,
) -> ApiResult<NoContent> {
    let service = PresenceService::new(state.service_context());
    service.set_presence(&auth.auth_id, request.is_online).await?;
    Ok(NoContent)
}

/// Keep the session alive
///
/// POST /users/@me/heartbeat
pub async fn heartbeat(State(state): State<AppState>, auth: AuthUser) -> ApiResult<NoContent> {
    let service = PresenceService::new(state.service_context());
    service.heartbeat(&auth.auth_id).await?;
    Ok(NoContent)
}
