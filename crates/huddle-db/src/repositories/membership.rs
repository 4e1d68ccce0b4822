//! PostgreSQL implementation of MembershipRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use huddle_core::entities::Membership;
use huddle_core::traits::{MembershipRepository, RepoResult};
use huddle_core::value_objects::Snowflake;

use crate::models::MembershipModel;

use super::error::{map_db_error, not_member};

/// PostgreSQL implementation of MembershipRepository
#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    /// Create a new PgMembershipRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Membership>> {
        let result = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT conversation_id, user_id, last_seen_at, typing_until, joined_at
            FROM conversation_members
            WHERE conversation_id = $1 AND user_id = $2
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Membership::from))
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Membership>> {
        let results = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT conversation_id, user_id, last_seen_at, typing_until, joined_at
            FROM conversation_members
            WHERE user_id = $1
            ORDER BY conversation_id
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Membership::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
    ) -> RepoResult<Vec<Membership>> {
        let results = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT conversation_id, user_id, last_seen_at, typing_until, joined_at
            FROM conversation_members
            WHERE conversation_id = $1
            ORDER BY joined_at, user_id
            ",
        )
        .bind(conversation_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Membership::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<DateTime<Utc>> {
        // GREATEST ignores NULL, so the first read takes `at`
        let stored = sqlx::query_scalar::<_, DateTime<Utc>>(
            r"
            UPDATE conversation_members
            SET last_seen_at = GREATEST(last_seen_at, $3)
            WHERE conversation_id = $1 AND user_id = $2
            RETURNING last_seen_at
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        stored.ok_or_else(|| not_member(conversation_id))
    }

    #[instrument(skip(self))]
    async fn set_typing_until(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        until: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE conversation_members
            SET typing_until = $3
            WHERE conversation_id = $1 AND user_id = $2
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_member(conversation_id));
        }

        Ok(())
    }
}
