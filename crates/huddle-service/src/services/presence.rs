//! Presence service
//!
//! Drives the session state machine of [`PresenceState`]. Only explicit
//! transitions are written; the heartbeat timeout is applied when reading.

use huddle_core::events::{DomainEvent, PresenceChangedEvent};
use huddle_core::PresenceState;
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `true` connects (or heartbeats), `false` disconnects
    #[instrument(skip(self))]
    pub async fn set_presence(&self, auth_id: &str, is_online: bool) -> ServiceResult<()> {
        let now = self.ctx.now();
        let timeout = self.ctx.settings().presence_timeout;
        let (user, previous) = self
            .ctx
            .user_repo()
            .transition_presence(auth_id, is_online, now)
            .await?;
        let was_online = previous.is_online_at(now, timeout);

        if was_online != is_online {
            debug!(user_id = %user.id, is_online, "Presence changed");
            self.ctx
                .publish(DomainEvent::PresenceChanged(PresenceChangedEvent {
                    user_id: user.id,
                    is_online,
                    timestamp: now,
                }))
                .await;
        }

        Ok(())
    }

    /// Keep the session alive
    pub async fn heartbeat(&self, auth_id: &str) -> ServiceResult<()> {
        self.set_presence(auth_id, true).await
    }

    /// Effective presence of a stored state right now
    pub fn is_online(&self, presence: &PresenceState) -> bool {
        presence.is_online_at(self.ctx.now(), self.ctx.settings().presence_timeout)
    }
}
