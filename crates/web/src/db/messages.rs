//! Chat message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopsync_core::{MessageId, ProductId, RoomId, UserId};

use super::RepositoryError;
use crate::models::{Message, MessageKind};

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: MessageId,
    room_id: RoomId,
    user_id: Option<UserId>,
    user_display_name: Option<String>,
    user_avatar: Option<String>,
    kind: String,
    content: String,
    product_id: Option<ProductId>,
    likes: i32,
    hearts: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let kind = MessageKind::from_str_opt(&row.kind).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "unknown message kind in database: {}",
                row.kind
            ))
        })?;

        Ok(Self {
            id: row.id,
            room_id: row.room_id,
            user_id: row.user_id,
            user_display_name: row.user_display_name,
            user_avatar: row.user_avatar,
            kind,
            content: row.content,
            product_id: row.product_id,
            likes: row.likes,
            hearts: row.hearts,
            created_at: row.created_at,
        })
    }
}

const SELECT_MESSAGE: &str = r"
    SELECT m.id, m.room_id, m.user_id,
           u.display_name AS user_display_name,
           u.avatar       AS user_avatar,
           m.kind, m.content, m.product_id, m.likes, m.hearts,
           m.created_at
    FROM messages m
    LEFT JOIN users u ON u.id = m.user_id
";

/// Which reaction counter to bump on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageReaction {
    Like,
    Heart,
}

/// Repository for chat messages.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Message history for a room, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown message kind.
    pub async fn list_for_room(&self, room_id: RoomId) -> Result<Vec<Message>, RepositoryError> {
        let sql = format!("{SELECT_MESSAGE} WHERE m.room_id = $1 ORDER BY m.created_at, m.id");
        let rows: Vec<MessageRow> = sqlx::query_as(&sql).bind(room_id).fetch_all(self.pool).await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    /// Post a message.
    ///
    /// `user_id` is `None` for system messages; `product_id` is set for
    /// product shares.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        room_id: RoomId,
        user_id: Option<UserId>,
        kind: MessageKind,
        content: &str,
        product_id: Option<ProductId>,
    ) -> Result<Message, RepositoryError> {
        let (id,): (MessageId,) = sqlx::query_as(
            r"
            INSERT INTO messages (room_id, user_id, kind, content, product_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(room_id)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(content)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Get a message by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let sql = format!("{SELECT_MESSAGE} WHERE m.id = $1");
        let row: Option<MessageRow> = sqlx::query_as(&sql).bind(id).fetch_optional(self.pool).await?;

        row.map(Message::try_from).transpose()
    }

    /// Bump a like/heart counter on a message. No per-user dedup - same
    /// rule as product reactions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such message exists.
    pub async fn add_reaction(
        &self,
        id: MessageId,
        reaction: MessageReaction,
    ) -> Result<Message, RepositoryError> {
        let sql = match reaction {
            MessageReaction::Like => "UPDATE messages SET likes = likes + 1 WHERE id = $1",
            MessageReaction::Heart => "UPDATE messages SET hearts = hearts + 1 WHERE id = $1",
        };

        let result = sqlx::query(sql).bind(id).execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }
}
