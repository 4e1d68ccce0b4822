//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, AuthConfig, ChatConfig, ConfigError, CorsConfig, DatabaseConfig,
    Environment, RateLimitConfig, RedisConfig, ServerConfig, SnowflakeConfig,
};
