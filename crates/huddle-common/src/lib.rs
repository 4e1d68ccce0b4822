//! # huddle-common
//!
//! Shared utilities: configuration, error handling, identity-token
//! verification and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{IdentityClaims, JwtService};
pub use config::{
    AppConfig, AppSettings, AuthConfig, ChatConfig, ConfigError, CorsConfig, DatabaseConfig,
    Environment, RateLimitConfig, RedisConfig, ServerConfig, SnowflakeConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{
    init_tracing, try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError,
};
