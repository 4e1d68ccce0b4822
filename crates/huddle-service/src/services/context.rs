//! Service context - dependency container for services
//!
//! Holds the repositories, the change publisher, the id generator, the clock
//! and the chat settings needed by services.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use huddle_common::ChatConfig;
use huddle_core::events::DomainEvent;
use huddle_core::traits::{
    Clock, ConversationRepository, EventPublisher, MembershipRepository, MessageRepository,
    NoopPublisher, SystemClock, UserRepository,
};
use huddle_core::{Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Tunables of the chat domain
#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    /// How long one typing pulse stays valid
    pub typing_lease: Duration,
    /// How long a connected user without heartbeat still reads as online
    pub presence_timeout: Duration,
    /// Message length limit in characters
    pub max_message_length: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

impl From<&ChatConfig> for ChatSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            typing_lease: Duration::milliseconds(config.typing_lease_ms),
            presence_timeout: Duration::seconds(config.presence_timeout_secs),
            max_message_length: config.max_message_length,
        }
    }
}

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    message_repo: Arc<dyn MessageRepository>,

    // Pub/Sub
    publisher: Arc<dyn EventPublisher>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    clock: Arc<dyn Clock>,
    settings: ChatSettings,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        conversation_repo: Arc<dyn ConversationRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        message_repo: Arc<dyn MessageRepository>,
        publisher: Arc<dyn EventPublisher>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        clock: Arc<dyn Clock>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            user_repo,
            conversation_repo,
            membership_repo,
            message_repo,
            publisher,
            snowflake_generator,
            clock,
            settings,
        }
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the conversation repository
    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    /// Get the membership repository
    pub fn membership_repo(&self) -> &dyn MembershipRepository {
        self.membership_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    // === Pub/Sub ===

    /// Publish a committed change. Failures are logged, never returned:
    /// the mutation has already been stored.
    pub async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(
                event_type = event.event_type(),
                error = %e,
                "Failed to publish change event"
            );
        }
    }

    // === Services ===

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    /// Current time from the configured clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    membership_repo: Option<Arc<dyn MembershipRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    clock: Option<Arc<dyn Clock>>,
    settings: ChatSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            conversation_repo: None,
            membership_repo: None,
            message_repo: None,
            publisher: None,
            snowflake_generator: None,
            clock: None,
            settings: ChatSettings::default(),
        }
    }

    /// Use one store for every repository
    pub fn store<S>(self, store: S) -> Self
    where
        S: UserRepository
            + ConversationRepository
            + MembershipRepository
            + MessageRepository
            + Clone
            + 'static,
    {
        self.user_repo(Arc::new(store.clone()))
            .conversation_repo(Arc::new(store.clone()))
            .membership_repo(Arc::new(store.clone()))
            .message_repo(Arc::new(store))
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn membership_repo(mut self, repo: Arc<dyn MembershipRepository>) -> Self {
        self.membership_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn settings(mut self, settings: ChatSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// The publisher defaults to a no-op, the clock to the system clock and
    /// the id generator to worker 0.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.conversation_repo
                .ok_or_else(|| ServiceError::validation("conversation_repo is required"))?,
            self.membership_repo
                .ok_or_else(|| ServiceError::validation("membership_repo is required"))?,
            self.message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            self.publisher.unwrap_or_else(|| Arc::new(NoopPublisher)),
            self.snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::new(0))),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.settings,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
