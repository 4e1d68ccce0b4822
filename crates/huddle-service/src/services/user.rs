//! User service
//!
//! Session sync (upsert keyed by the identity-provider subject), caller
//! resolution and the user directory.

use huddle_core::entities::{User, UserProfile};
use huddle_core::events::{DomainEvent, UserUpsertedEvent};
use huddle_core::{DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CurrentUserResponse, SyncUserRequest, UserSummaryResponse, UserWithPresence};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create or refresh the caller's user record; the sync counts as a
    /// heartbeat. Returns the (stable) user id.
    #[instrument(skip(self, request))]
    pub async fn sync_user(
        &self,
        auth_id: &str,
        request: SyncUserRequest,
    ) -> ServiceResult<Snowflake> {
        request.validate()?;

        let now = self.ctx.now();
        let profile = UserProfile {
            auth_id: auth_id.to_string(),
            display_name: request.name.trim().to_string(),
            email: request.email,
            avatar_url: request.avatar_url,
        };
        let candidate = User::from_profile(self.ctx.generate_id(), profile, now);

        let (user, created) = self.ctx.user_repo().upsert(&candidate).await?;

        if created {
            info!(user_id = %user.id, "User registered");
        }

        self.ctx
            .publish(DomainEvent::UserUpserted(UserUpsertedEvent {
                user_id: user.id,
                created,
                timestamp: now,
            }))
            .await;

        Ok(user.id)
    }

    /// Resolve the caller's user record; `UserNotSynced` if they never synced
    #[instrument(skip(self))]
    pub async fn resolve_user(&self, auth_id: &str) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_auth_id(auth_id)
            .await?
            .ok_or(DomainError::UserNotSynced)?)
    }

    /// Get current authenticated user
    #[instrument(skip(self))]
    pub async fn get_current_user(&self, auth_id: &str) -> ServiceResult<CurrentUserResponse> {
        let user = self.resolve_user(auth_id).await?;

        Ok(CurrentUserResponse::from(UserWithPresence {
            user: &user,
            now: self.ctx.now(),
            timeout: self.ctx.settings().presence_timeout,
        }))
    }

    /// Every other user, by display name, with effective presence
    #[instrument(skip(self))]
    pub async fn list_other_users(&self, auth_id: &str) -> ServiceResult<Vec<UserSummaryResponse>> {
        let users = self.ctx.user_repo().list_excluding(auth_id).await?;
        let now = self.ctx.now();
        let timeout = self.ctx.settings().presence_timeout;

        Ok(users
            .iter()
            .map(|user| UserSummaryResponse::from(UserWithPresence { user, now, timeout }))
            .collect())
    }
}
