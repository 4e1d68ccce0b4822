//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    /// Change notifications are disabled when absent
    pub redis: Option<RedisConfig>,
    pub auth: AuthConfig,
    pub chat: ChatConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` or `memory://` for the in-process store
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
    /// Overrides the bundled migrations directory
    #[serde(default)]
    pub migrations_dir: Option<String>,
}

impl DatabaseConfig {
    /// Whether the in-memory store was requested
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory:")
    }
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Identity-provider token verification
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 shared secret
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// RS256 public key (PEM); takes precedence over the secret
    #[serde(default)]
    pub public_key_pem: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default = "default_auth_leeway")]
    pub leeway_secs: u64,
}

/// Chat domain tunables
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_typing_lease_ms")]
    pub typing_lease_ms: i64,
    #[serde(default = "default_presence_timeout_secs")]
    pub presence_timeout_secs: i64,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_lease_ms: default_typing_lease_ms(),
            presence_timeout_secs: default_presence_timeout_secs(),
            max_message_length: default_max_message_length(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "huddle".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_run_migrations() -> bool {
    true
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_auth_leeway() -> u64 {
    30
}

fn default_typing_lease_ms() -> i64 {
    2000
}

fn default_presence_timeout_secs() -> i64 {
    60
}

fn default_max_message_length() -> usize {
    4000
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

/// Parse an optional variable, reporting malformed values instead of ignoring them
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        _ => Ok(default()),
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("APP_ENV") {
            Some(raw) => raw
                .parse()
                .map_err(|()| ConfigError::InvalidValue("APP_ENV", raw))?,
            None => Environment::default(),
        };

        let auth = AuthConfig {
            jwt_secret: non_empty(&lookup, "AUTH_JWT_SECRET"),
            public_key_pem: non_empty(&lookup, "AUTH_PUBLIC_KEY_PEM"),
            issuer: non_empty(&lookup, "AUTH_ISSUER"),
            audience: non_empty(&lookup, "AUTH_AUDIENCE"),
            leeway_secs: parse_var(&lookup, "AUTH_LEEWAY_SECS", default_auth_leeway)?,
        };
        if auth.jwt_secret.is_none() && auth.public_key_pem.is_none() {
            return Err(ConfigError::MissingVar("AUTH_JWT_SECRET"));
        }

        let redis = match non_empty(&lookup, "REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: parse_var(
                    &lookup,
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections,
                )?,
            }),
            None => None,
        };

        let chat = ChatConfig {
            typing_lease_ms: parse_var(&lookup, "CHAT_TYPING_LEASE_MS", default_typing_lease_ms)?,
            presence_timeout_secs: parse_var(
                &lookup,
                "CHAT_PRESENCE_TIMEOUT_SECS",
                default_presence_timeout_secs,
            )?,
            max_message_length: parse_var(
                &lookup,
                "CHAT_MAX_MESSAGE_LENGTH",
                default_max_message_length,
            )?,
        };
        if chat.typing_lease_ms <= 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_TYPING_LEASE_MS",
                chat.typing_lease_ms.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(default_host),
                port: parse_var(&lookup, "SERVER_PORT", default_port)?,
            },
            database: DatabaseConfig {
                url: non_empty(&lookup, "DATABASE_URL")
                    .ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_var(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    default_max_connections,
                )?,
                min_connections: parse_var(
                    &lookup,
                    "DATABASE_MIN_CONNECTIONS",
                    default_min_connections,
                )?,
                run_migrations: parse_var(
                    &lookup,
                    "DATABASE_RUN_MIGRATIONS",
                    default_run_migrations,
                )?,
                migrations_dir: non_empty(&lookup, "DATABASE_MIGRATIONS_DIR"),
            },
            redis,
            auth,
            chat,
            rate_limit: RateLimitConfig {
                enabled: parse_var(&lookup, "RATE_LIMIT_ENABLED", || false)?,
                requests_per_second: parse_var(
                    &lookup,
                    "RATE_LIMIT_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: parse_var(&lookup, "RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_var(&lookup, "WORKER_ID", || 0)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
