//! Change-notification port

use async_trait::async_trait;

use crate::error::DomainError;
use crate::events::DomainEvent;

/// Publishes committed changes to subscribers outside this process
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<(), DomainError>;
}

/// Publisher used when no bus is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event: &DomainEvent) -> Result<(), DomainError> {
        Ok(())
    }
}
