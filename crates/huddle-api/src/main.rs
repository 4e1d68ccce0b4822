//! Huddle API Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p huddle-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use huddle_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration first so the log format can follow APP_ENV
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let tracing_config = TracingConfig::for_environment(config.app.env);
    if let Err(e) = try_init_tracing_with_config(&tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.api.port,
        store = if config.database.is_memory() { "memory" } else { "postgres" },
        notifications = config.redis.is_some(),
        "Configuration loaded"
    );

    if let Err(e) = huddle_api::run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
