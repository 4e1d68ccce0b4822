//! Redis Pub/Sub module.
//!
//! Publishes committed changes for distribution to subscribers.

mod channels;
mod publisher;

pub use channels::{PubSubChannel, CONVERSATION_CHANNEL_PREFIX, USER_CHANNEL_PREFIX};
pub use publisher::{channels_for, PubSubEvent, Publisher, RedisEventPublisher};
