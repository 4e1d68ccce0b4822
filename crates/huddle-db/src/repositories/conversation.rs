//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use huddle_core::entities::Conversation;
use huddle_core::error::DomainError;
use huddle_core::traits::{ConversationRepository, RepoResult};
use huddle_core::value_objects::Snowflake;

use crate::mappers::ConversationInsert;
use crate::models::ConversationModel;

use super::error::{map_db_error, map_foreign_key_violation, map_unique_violation};

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    /// Create a new PgConversationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Advisory lock key for the unordered pair; both orderings map to one key
fn direct_pair_key(a: Snowflake, b: Snowflake) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("direct:{low}:{high}")
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT id, is_group, name, last_message, last_message_at, last_message_id, created_at
            FROM conversations
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self, candidate))]
    async fn find_or_create_direct(
        &self,
        candidate: &Conversation,
        user_id: Snowflake,
        participant_id: Snowflake,
    ) -> RepoResult<(Conversation, bool)> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // serializes concurrent resolutions of the same pair until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(direct_pair_key(user_id, participant_id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let existing = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT c.id, c.is_group, c.name, c.last_message, c.last_message_at,
                   c.last_message_id, c.created_at
            FROM conversations c
            JOIN conversation_members a ON a.conversation_id = c.id AND a.user_id = $1
            JOIN conversation_members b ON b.conversation_id = c.id AND b.user_id = $2
            WHERE NOT c.is_group
            ORDER BY c.id
            LIMIT 1
            ",
        )
        .bind(user_id.into_inner())
        .bind(participant_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if let Some(model) = existing {
            tx.commit().await.map_err(map_db_error)?;
            return Ok((Conversation::from(model), false));
        }

        let insert = ConversationInsert::new(candidate);
        sqlx::query(
            r"
            INSERT INTO conversations (id, is_group, name, created_at)
            VALUES ($1, FALSE, NULL, $2)
            ",
        )
        .bind(insert.id)
        .bind(insert.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::Conflict(format!("conversation {} already exists", candidate.id))
            })
        })?;

        sqlx::query(
            r"
            INSERT INTO conversation_members (conversation_id, user_id, joined_at)
            VALUES ($1, $2, $4), ($1, $3, $4)
            ",
        )
        .bind(insert.id)
        .bind(user_id.into_inner())
        .bind(participant_id.into_inner())
        .bind(insert.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_foreign_key_violation(e, || DomainError::UserNotFound(participant_id)))?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(conversation_id = %candidate.id, "Direct conversation created");
        Ok((candidate.clone(), true))
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn create_group(
        &self,
        conversation: &Conversation,
        member_ids: &[Snowflake],
    ) -> RepoResult<()> {
        let insert = ConversationInsert::new(conversation);
        let members: Vec<i64> = member_ids.iter().map(|id| id.into_inner()).collect();

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let missing = sqlx::query_scalar::<_, i64>(
            r"
            SELECT member_id
            FROM UNNEST($1::BIGINT[]) AS member_id
            WHERE NOT EXISTS (SELECT 1 FROM users WHERE users.id = member_id)
            LIMIT 1
            ",
        )
        .bind(&members)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;
        if let Some(missing) = missing {
            return Err(DomainError::UserNotFound(Snowflake::new(missing)));
        }

        sqlx::query(
            r"
            INSERT INTO conversations (id, is_group, name, created_at)
            VALUES ($1, TRUE, $2, $3)
            ",
        )
        .bind(insert.id)
        .bind(insert.name)
        .bind(insert.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::Conflict(format!("conversation {} already exists", conversation.id))
            })
        })?;

        sqlx::query(
            r"
            INSERT INTO conversation_members (conversation_id, user_id, joined_at)
            SELECT $1, member_id, $3
            FROM UNNEST($2::BIGINT[]) AS member_id
            ON CONFLICT (conversation_id, user_id) DO NOTHING
            ",
        )
        .bind(insert.id)
        .bind(&members)
        .bind(insert.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}
