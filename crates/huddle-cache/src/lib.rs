//! # huddle-cache
//!
//! Redis layer for change notification.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: Committed domain events fan out to `conversation:{id}` and
//!   `user:{id}` channels so that other instances and live clients can refresh
//!
//! ## Example
//!
//! ```ignore
//! use huddle_cache::{RedisEventPublisher, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = RedisEventPublisher::new(pool);
//!
//! // hand it to the service layer as `Arc<dyn EventPublisher>`
//! ```

pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

// Re-export pubsub types
pub use pubsub::{
    PubSubChannel, PubSubEvent, Publisher, RedisEventPublisher, CONVERSATION_CHANNEL_PREFIX,
    USER_CHANNEL_PREFIX,
};
