//! Database connection pool management and migrations

mod postgres;

pub use postgres::{create_pool, run_migrations, DatabaseConfig, DEFAULT_MIGRATIONS_DIR};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
