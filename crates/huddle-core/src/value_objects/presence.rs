//! Presence - session lifecycle of a user
//!
//! ```text
//! Disconnected --connect/heartbeat--> Connected { last_heartbeat }
//! Connected    --heartbeat----------> Connected { now }
//! Connected    --disconnect---------> Disconnected
//! Connected    --(timeout elapses)--> reads as offline
//! ```
//!
//! The timeout transition is never written. A stale `Connected` state is
//! reinterpreted as offline at read time, so crashed clients need no cleanup.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PresenceState {
    Connected {
        last_heartbeat: DateTime<Utc>,
    },
    Disconnected {
        last_seen: Option<DateTime<Utc>>,
    },
}

impl PresenceState {
    /// Rebuild the state from its stored columns
    pub fn from_parts(is_online: bool, last_heartbeat: Option<DateTime<Utc>>) -> Self {
        match (is_online, last_heartbeat) {
            (true, Some(last_heartbeat)) => Self::Connected { last_heartbeat },
            (_, last_seen) => Self::Disconnected { last_seen },
        }
    }

    /// Stored columns: `(is_online, last_heartbeat_at)`
    pub fn into_parts(self) -> (bool, Option<DateTime<Utc>>) {
        match self {
            Self::Connected { last_heartbeat } => (true, Some(last_heartbeat)),
            Self::Disconnected { last_seen } => (false, last_seen),
        }
    }

    pub fn connected(now: DateTime<Utc>) -> Self {
        Self::Connected {
            last_heartbeat: now,
        }
    }

    /// A heartbeat always (re)connects
    pub fn heartbeat(self, now: DateTime<Utc>) -> Self {
        Self::connected(now)
    }

    pub fn disconnect(self) -> Self {
        match self {
            Self::Connected { last_heartbeat } => Self::Disconnected {
                last_seen: Some(last_heartbeat),
            },
            disconnected @ Self::Disconnected { .. } => disconnected,
        }
    }

    /// Whether the session counts as online at `now`
    pub fn is_online_at(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        match self {
            Self::Connected { last_heartbeat } => now - *last_heartbeat <= timeout,
            Self::Disconnected { .. } => false,
        }
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Connected { last_heartbeat } => Some(*last_heartbeat),
            Self::Disconnected { last_seen } => *last_seen,
        }
    }
}

impl Default for PresenceState {
    fn default() -> Self {
        Self::Disconnected { last_seen: None }
    }
}
