//! Application state
//!
//! Holds the shared state for the Axum application including
//! the service context, the token verifier and the backing services
//! checked by the readiness probe.

use std::sync::Arc;

use huddle_cache::RedisPool;
use huddle_common::{AppConfig, JwtService};
use huddle_db::PgPool;
use huddle_service::ServiceContext;

/// Storage behind the repositories
#[derive(Clone, Debug)]
pub enum StoreBackend {
    /// Process-local store; always reachable
    Memory,
    Postgres(PgPool),
}

impl StoreBackend {
    /// Whether the store can currently serve requests
    pub async fn is_healthy(&self) -> bool {
        match self {
            Self::Memory => true,
            Self::Postgres(pool) => pool.acquire().await.is_ok(),
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Application configuration
    config: Arc<AppConfig>,
    jwt_service: Arc<JwtService>,
    store: StoreBackend,
    /// `None` when change notifications are disabled
    redis: Option<RedisPool>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        jwt_service: JwtService,
        store: StoreBackend,
        redis: Option<RedisPool>,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            jwt_service: Arc::new(jwt_service),
            store,
            redis,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the identity token verifier
    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn store(&self) -> &StoreBackend {
        &self.store
    }

    pub fn redis(&self) -> Option<&RedisPool> {
        self.redis.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("store", &self.store)
            .field("redis", &self.redis.is_some())
            .finish()
    }
}
