//! Shared fixtures: services over the in-memory store with a manual clock

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;

use huddle_core::events::DomainEvent;
use huddle_core::{DomainError, EventPublisher, ManualClock, Snowflake};
use huddle_db::MemoryStore;
use huddle_service::dto::SyncUserRequest;
use huddle_service::{
    ConversationService, MessageService, PresenceService, ServiceContext, ServiceContextBuilder,
    ServiceError, UserService,
};

/// Keeps every published event for inspection
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingPublisher {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DomainEvent::event_type).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), DomainError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Publisher whose bus is always down
pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: &DomainEvent) -> Result<(), DomainError> {
        Err(DomainError::CacheError("bus unavailable".to_string()))
    }
}

pub struct Harness {
    pub ctx: ServiceContext,
    pub clock: Arc<ManualClock>,
    pub events: Arc<RecordingPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        let events = Arc::new(RecordingPublisher::default());
        let ctx = ServiceContextBuilder::new()
            .store(MemoryStore::new())
            .clock(clock.clone())
            .publisher(events.clone())
            .build()
            .unwrap();
        Self { ctx, clock, events }
    }

    pub fn with_failing_publisher() -> Self {
        let harness = Self::new();
        let clock = harness.clock.clone();
        let ctx = ServiceContextBuilder::new()
            .store(MemoryStore::new())
            .clock(clock.clone())
            .publisher(Arc::new(FailingPublisher))
            .build()
            .unwrap();
        Self { ctx, ..harness }
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.ctx)
    }

    pub fn presence(&self) -> PresenceService<'_> {
        PresenceService::new(&self.ctx)
    }

    pub fn conversations(&self) -> ConversationService<'_> {
        ConversationService::new(&self.ctx)
    }

    pub fn messages(&self) -> MessageService<'_> {
        MessageService::new(&self.ctx)
    }

    /// Sync a user whose auth id is derived from the name
    pub async fn user(&self, name: &str) -> Snowflake {
        self.users()
            .sync_user(&auth_id(name), sync_request(name))
            .await
            .unwrap()
    }

    pub fn advance_ms(&self, ms: i64) {
        self.clock.advance(Duration::milliseconds(ms));
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(Duration::seconds(secs));
    }
}

pub fn auth_id(name: &str) -> String {
    format!("idp|{}", name.to_lowercase())
}

pub fn sync_request(name: &str) -> SyncUserRequest {
    SyncUserRequest {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        avatar_url: None,
    }
}

/// The domain error behind a service error
pub fn domain(err: &ServiceError) -> &DomainError {
    err.as_domain().unwrap_or_else(|| panic!("expected a domain error, got {err:?}"))
}
