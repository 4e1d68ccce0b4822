//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use huddle_core::entities::{Message, DELETED_MESSAGE_PLACEHOLDER};
use huddle_core::error::DomainError;
use huddle_core::traits::{MessageRepository, RepoResult};
use huddle_core::value_objects::Snowflake;

use crate::mappers::{attach_reactions, MessageInsert};
use crate::models::{MessageModel, ReactionModel};

use super::error::{conversation_not_found, map_db_error, map_unique_violation, message_not_found};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load reaction rows for a set of messages, oldest first
    async fn load_reactions(&self, message_ids: &[i64]) -> Result<Vec<ReactionModel>, DomainError> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT message_id, user_id, emoji, created_at
            FROM message_reactions
            WHERE message_id = ANY($1)
            ORDER BY created_at, user_id, emoji
            ",
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    /// Lock the message row for the rest of the transaction
    async fn lock_message(
        tx: &mut Transaction<'_, Postgres>,
        id: Snowflake,
    ) -> Result<MessageModel, DomainError> {
        sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, conversation_id, sender_id, content, created_at,
                   deleted, is_edited, edited_at
            FROM messages
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| message_not_found(id))
    }

    async fn load_one(&self, model: MessageModel) -> Result<Message, DomainError> {
        let reactions = self.load_reactions(&[model.id]).await?;
        let mut message = Message::from(model);
        message.reactions = reactions.into_iter().map(Into::into).collect();
        Ok(message)
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, conversation_id, sender_id, content, created_at,
                   deleted, is_edited, edited_at
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match result {
            Some(model) => Ok(Some(self.load_one(model).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>> {
        let models = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, conversation_id, sender_id, content, created_at,
                   deleted, is_edited, edited_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(conversation_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let reactions = self.load_reactions(&ids).await?;

        Ok(attach_reactions(models, reactions))
    }

    #[instrument(skip(self))]
    async fn count_since(
        &self,
        conversation_id: Snowflake,
        since: Option<DateTime<Utc>>,
    ) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM messages
            WHERE conversation_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR created_at > $2)
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn append(&self, message: &Message) -> RepoResult<()> {
        let insert = MessageInsert::new(message);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let updated = sqlx::query(
            r"
            UPDATE conversations
            SET last_message = $2, last_message_at = $3, last_message_id = $4
            WHERE id = $1
            ",
        )
        .bind(insert.conversation_id)
        .bind(insert.content)
        .bind(insert.created_at)
        .bind(insert.id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if updated.rows_affected() == 0 {
            return Err(conversation_not_found(message.conversation_id));
        }

        sqlx::query(
            r"
            INSERT INTO messages (id, conversation_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(insert.id)
        .bind(insert.conversation_id)
        .bind(insert.sender_id)
        .bind(insert.content)
        .bind(insert.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::Conflict(format!("message {} already exists", message.id))
            })
        })?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, content))]
    async fn update_content(
        &self,
        id: Snowflake,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<Message> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut message = Message::from(Self::lock_message(&mut tx, id).await?);
        message.edit(content.to_string(), edited_at)?;

        sqlx::query(
            r"
            UPDATE messages
            SET content = $2, is_edited = TRUE, edited_at = $3
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(&message.content)
        .bind(edited_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            UPDATE conversations
            SET last_message = $2
            WHERE id = $1 AND last_message_id = $3
            ",
        )
        .bind(message.conversation_id.into_inner())
        .bind(&message.content)
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        let reactions = self.load_reactions(&[id.into_inner()]).await?;
        message.reactions = reactions.into_iter().map(Into::into).collect();
        Ok(message)
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: Snowflake) -> RepoResult<Message> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut message = Message::from(Self::lock_message(&mut tx, id).await?);
        if !message.soft_delete() {
            tx.commit().await.map_err(map_db_error)?;
            return Ok(message);
        }

        sqlx::query("UPDATE messages SET content = $2, deleted = TRUE WHERE id = $1")
            .bind(id.into_inner())
            .bind(DELETED_MESSAGE_PLACEHOLDER)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("DELETE FROM message_reactions WHERE message_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query(
            r"
            UPDATE conversations
            SET last_message = $2
            WHERE id = $1 AND last_message_id = $3
            ",
        )
        .bind(message.conversation_id.into_inner())
        .bind(DELETED_MESSAGE_PLACEHOLDER)
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(message)
    }

    #[instrument(skip(self))]
    async fn toggle_reaction(
        &self,
        id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // serializes toggles on the message and excludes a concurrent delete
        let deleted = sqlx::query_scalar::<_, bool>(
            "SELECT deleted FROM messages WHERE id = $1 FOR UPDATE",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| message_not_found(id))?;

        if deleted {
            return Err(DomainError::MessageDeleted(id));
        }

        let removed = sqlx::query(
            r"
            DELETE FROM message_reactions
            WHERE message_id = $1 AND user_id = $2 AND emoji = $3
            ",
        )
        .bind(id.into_inner())
        .bind(user_id.into_inner())
        .bind(emoji)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let active = if removed.rows_affected() > 0 {
            false
        } else {
            let inserted = sqlx::query(
                r"
                INSERT INTO message_reactions (message_id, user_id, emoji, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (message_id, user_id, emoji) DO NOTHING
                ",
            )
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .bind(emoji)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
            inserted.rows_affected() == 1
        };

        tx.commit().await.map_err(map_db_error)?;

        Ok(active)
    }
}
