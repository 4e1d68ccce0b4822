//! Authentication extractors
//!
//! [`AuthUser`] verifies the bearer identity token. [`CurrentUser`] also
//! resolves the token subject to a synced user record.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use huddle_common::IdentityClaims;
use huddle_core::Snowflake;
use huddle_service::UserService;

use crate::response::ApiError;
use crate::state::AppState;

/// Caller authenticated by the identity provider
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity-provider subject
    pub auth_id: String,
    pub claims: IdentityClaims,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        let claims = app_state.jwt_service().verify(bearer.token()).map_err(|e| {
            tracing::warn!(error = %e, "Rejected identity token");
            ApiError::App(e)
        })?;

        Ok(AuthUser {
            auth_id: claims.sub.clone(),
            claims,
        })
    }
}

/// Authenticated caller with a synced user record
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Snowflake,
    pub auth_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        let app_state = AppState::from_ref(state);
        let user = UserService::new(app_state.service_context())
            .resolve_user(&auth.auth_id)
            .await?;

        Ok(CurrentUser {
            user_id: user.id,
            auth_id: auth.auth_id,
        })
    }
}
