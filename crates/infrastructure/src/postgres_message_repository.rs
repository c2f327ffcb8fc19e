//! PostgreSQL-backed committee chat repository.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sandwich_application::{Message, MessageRepository};
use sandwich_core::{AppError, AppResult, UserId};
use sandwich_domain::MessageChannel;

/// PostgreSQL implementation of the message repository port.
#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    channel: String,
    sender_id: Uuid,
    sender_name: String,
    body: String,
    created_at: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let channel = MessageChannel::from_str(row.channel.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode channel of message '{}': {error}",
                row.id
            ))
        })?;

        Ok(Self {
            message_id: row.id,
            channel,
            sender_id: UserId::from_uuid(row.sender_id),
            sender_name: row.sender_name,
            body: row.body,
            created_at: row.created_at,
        })
    }
}

const MESSAGE_COLUMNS: &str = r#"
    id, channel, sender_id, sender_name, body,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
"#;

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn list_channel(
        &self,
        channel: MessageChannel,
        limit: usize,
    ) -> AppResult<Vec<Message>> {
        // Newest rows win the limit; the page is returned oldest first.
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT * FROM (
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE channel = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
            ) AS page
            ORDER BY page.created_at, page.id
            "#
        ))
        .bind(channel.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list messages: {error}")))?;

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn find(&self, message_id: Uuid) -> AppResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load message: {error}")))?;

        row.map(Message::try_from).transpose()
    }

    async fn create(
        &self,
        channel: MessageChannel,
        sender_id: UserId,
        sender_name: &str,
        body: &str,
    ) -> AppResult<Message> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            INSERT INTO messages (channel, sender_id, sender_name, body)
            VALUES ($1, $2, $3, $4)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(channel.as_str())
        .bind(sender_id.as_uuid())
        .bind(sender_name)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create message: {error}")))?;

        Message::try_from(row)
    }

    async fn delete(&self, message_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(message_id)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete message: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "message '{message_id}' was not found"
            )));
        }

        Ok(())
    }
}
