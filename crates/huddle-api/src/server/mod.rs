//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use huddle_cache::{RedisEventPublisher, RedisPool};
use huddle_common::{AppConfig, AppError, JwtService};
use huddle_core::{EventPublisher, NoopPublisher, SnowflakeGenerator};
use huddle_db::{
    create_pool, run_migrations, DatabaseConfig, MemoryStore, PgConversationRepository,
    PgMembershipRepository, PgMessageRepository, PgUserRepository,
};
use huddle_service::{ChatSettings, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::{AppState, StoreBackend};

/// Build the complete Axum application with all routes and middleware
///
/// Health routes sit outside the rate limiter.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;

    Ok(api.merge(health_routes()).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let jwt_service = JwtService::from_config(&config.auth)?;

    // Change notifications
    let redis = match &config.redis {
        Some(redis_config) => {
            info!("Creating Redis pool for change notifications...");
            Some(RedisPool::from_config(redis_config).map_err(|e| AppError::Cache(e.to_string()))?)
        }
        None => {
            warn!("REDIS_URL not set; change notifications are disabled");
            None
        }
    };
    let publisher: Arc<dyn EventPublisher> = match &redis {
        Some(pool) => Arc::new(RedisEventPublisher::new(pool.clone())),
        None => Arc::new(NoopPublisher),
    };

    let builder = ServiceContextBuilder::new()
        .publisher(publisher)
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .settings(ChatSettings::from(&config.chat));

    let (builder, store) = if config.database.is_memory() {
        warn!("Using the in-memory store; data is lost on restart");
        (builder.store(MemoryStore::new()), StoreBackend::Memory)
    } else {
        info!("Connecting to PostgreSQL...");
        let pool = create_pool(&DatabaseConfig::from(&config.database))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        info!("PostgreSQL connection established");

        if config.database.run_migrations {
            run_migrations(&pool, config.database.migrations_dir.as_deref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("Database migrations applied");
        }

        let builder = builder
            .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
            .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
            .membership_repo(Arc::new(PgMembershipRepository::new(pool.clone())))
            .message_repo(Arc::new(PgMessageRepository::new(pool.clone())));
        (builder, StoreBackend::Postgres(pool))
    };

    let service_context = builder
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, jwt_service, store, redis))
}

/// Serve `app` on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), AppError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {e}")))?;

    // Create app state
    let state = create_app_state(config).await?;

    // Build application
    let app = create_app(state)?;

    info!("Starting HTTP server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app, shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

/// Resolves on ctrl-c or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
