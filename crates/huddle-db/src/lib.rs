//! # huddle-db
//!
//! Persistence layer implementing the huddle-core repository traits.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repository implementations
//! - [`MemoryStore`], a process-local implementation of every repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use huddle_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use huddle_db::repositories::PgUserRepository;
//! use huddle_core::traits::UserRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool, None).await?;
//!     let user_repo = PgUserRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool, DEFAULT_MIGRATIONS_DIR};
pub use repositories::{
    PgConversationRepository, PgMembershipRepository, PgMessageRepository, PgUserRepository,
};
