//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use huddle_core::entities::User;
use huddle_core::error::DomainError;
use huddle_core::traits::{RepoResult, UserRepository};
use huddle_core::value_objects::{PresenceState, Snowflake};

use crate::mappers::UserInsert;
use crate::models::UserModel;

use super::error::map_db_error;

const USER_COLUMNS: &str = "id, auth_id, display_name, email, avatar_url, is_online, \
                            last_heartbeat_at, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_auth_id(&self, auth_id: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE auth_id = $1"
        ))
        .bind(auth_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        let results = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(&raw)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self, candidate), fields(auth_id = %candidate.auth_id))]
    async fn upsert(&self, candidate: &User) -> RepoResult<(User, bool)> {
        let insert = UserInsert::new(candidate);

        // the existing row keeps its id and created_at
        let model = sqlx::query_as::<_, UserModel>(&format!(
            r"
            INSERT INTO users (id, auth_id, display_name, email, avatar_url,
                               is_online, last_heartbeat_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (auth_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                avatar_url = EXCLUDED.avatar_url,
                is_online = EXCLUDED.is_online,
                last_heartbeat_at = EXCLUDED.last_heartbeat_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(insert.id)
        .bind(insert.auth_id)
        .bind(insert.display_name)
        .bind(insert.email)
        .bind(insert.avatar_url)
        .bind(insert.is_online)
        .bind(insert.last_heartbeat_at)
        .bind(insert.created_at)
        .bind(insert.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let created = model.id == insert.id;
        Ok((User::from(model), created))
    }

    #[instrument(skip(self))]
    async fn transition_presence(
        &self,
        auth_id: &str,
        connect: bool,
        now: DateTime<Utc>,
    ) -> RepoResult<(User, PresenceState)> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // row lock orders concurrent transitions of the same user
        let current = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE auth_id = $1 FOR UPDATE"
        ))
        .bind(auth_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(User::from)
        .ok_or(DomainError::UserNotSynced)?;

        let previous = current.presence;
        let next = if connect {
            previous.heartbeat(now)
        } else {
            previous.disconnect()
        };
        let (is_online, last_heartbeat_at) = next.into_parts();

        let stored = sqlx::query_as::<_, UserModel>(&format!(
            r"
            UPDATE users
            SET is_online = $2, last_heartbeat_at = $3, updated_at = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(current.id.into_inner())
        .bind(is_online)
        .bind(last_heartbeat_at)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok((User::from(stored), previous))
    }

    #[instrument(skip(self))]
    async fn list_excluding(&self, auth_id: &str) -> RepoResult<Vec<User>> {
        let results = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE auth_id <> $1 ORDER BY display_name, id"
        ))
        .bind(auth_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(User::from).collect())
    }
}
