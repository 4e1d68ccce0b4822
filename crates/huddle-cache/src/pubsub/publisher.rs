//! Redis Pub/Sub publisher.
//!
//! Domain events are wrapped in a [`PubSubEvent`] envelope and published to
//! every channel the event concerns. Delivery is at-most-once; a subscriber
//! that misses a notification re-reads state on its next query.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use huddle_core::error::DomainError;
use huddle_core::events::DomainEvent;
use huddle_core::traits::EventPublisher;

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Unique per publication, lets subscribers drop duplicates
    pub event_id: Uuid,
    /// Event type name (e.g., "MESSAGE_CREATED", "TYPING_CHANGED")
    pub event_type: String,
    /// Event payload
    pub data: serde_json::Value,
}

impl PubSubEvent {
    /// Create a new event
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            data,
        }
    }

    /// Wrap a domain event
    ///
    /// # Errors
    /// Fails only if the event cannot be serialized
    pub fn from_domain(event: &DomainEvent) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event.event_type(), serde_json::to_value(event)?))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Channels a domain event is published to
#[must_use]
pub fn channels_for(event: &DomainEvent) -> Vec<PubSubChannel> {
    let mut channels: Vec<PubSubChannel> = event
        .conversation_id()
        .map(PubSubChannel::conversation)
        .into_iter()
        .collect();
    channels.extend(event.user_ids().into_iter().map(PubSubChannel::user));
    channels
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event to a channel
    pub async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        self.publish_many(std::slice::from_ref(channel), event).await
    }

    /// Publish to multiple channels over one connection
    pub async fn publish_many(
        &self,
        channels: &[PubSubChannel],
        event: &PubSubEvent,
    ) -> RedisResult<u32> {
        if channels.is_empty() {
            return Ok(0);
        }

        let payload = event.to_json()?;
        let mut total_receivers = 0;
        let mut conn = self.pool.get().await?;

        for channel in channels {
            let channel_name = channel.name();
            let receivers: u32 = conn.publish(&channel_name, &payload).await?;
            total_receivers += receivers;
        }

        tracing::debug!(
            channels = channels.len(),
            event_type = %event.event_type,
            total_receivers = total_receivers,
            "Published event"
        );

        Ok(total_receivers)
    }
}

/// [`EventPublisher`] backed by Redis Pub/Sub
#[derive(Clone)]
pub struct RedisEventPublisher {
    publisher: Publisher,
}

impl RedisEventPublisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            publisher: Publisher::new(pool),
        }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), DomainError> {
        let envelope =
            PubSubEvent::from_domain(event).map_err(|e| DomainError::CacheError(e.to_string()))?;

        self.publisher
            .publish_many(&channels_for(event), &envelope)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::CacheError(e.to_string()))
    }
}
