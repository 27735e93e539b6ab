//! Room repository for database operations.
//!
//! Rooms are private: every read except the join-by-code lookup is scoped
//! to a member.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopsync_core::{RoomCode, RoomId, UserId};

use super::RepositoryError;
use crate::models::{Room, RoomSummary};

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: RoomId,
    name: String,
    code: RoomCode,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoomSummaryRow {
    id: RoomId,
    name: String,
    code: RoomCode,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
    member_count: i64,
    items_in_cart: i64,
    last_activity: Option<DateTime<Utc>>,
}

impl From<RoomSummaryRow> for RoomSummary {
    fn from(row: RoomSummaryRow) -> Self {
        Self {
            room: Room {
                id: row.id,
                name: row.name,
                code: row.code,
                created_by: row.created_by,
                created_at: row.created_at,
            },
            member_count: row.member_count,
            items_in_cart: row.items_in_cart,
            last_activity: row.last_activity,
        }
    }
}

/// Repository for room database operations.
pub struct RoomRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoomRepository<'a> {
    /// Create a new room repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a room and enroll its creator as the first member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the generated code collides
    /// (the caller regenerates and retries).
    pub async fn create(
        &self,
        name: &str,
        code: &RoomCode,
        created_by: UserId,
    ) -> Result<Room, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: RoomRow = sqlx::query_as(
            r"
            INSERT INTO rooms (name, code, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, code, created_by, created_at
            ",
        )
        .bind(name)
        .bind(code)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                RepositoryError::Conflict("room code already in use".to_string())
            } else {
                RepositoryError::Database(e)
            }
        })?;

        sqlx::query(
            r"
            INSERT INTO room_members (room_id, user_id)
            VALUES ($1, $2)
            ",
        )
        .bind(row.id)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Look up a room by its join code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_code(&self, code: &RoomCode) -> Result<Option<Room>, RepositoryError> {
        let row: Option<RoomRow> = sqlx::query_as(
            r"
            SELECT id, name, code, created_by, created_at
            FROM rooms
            WHERE code = $1
            ",
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Room::from))
    }

    /// Get a room by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let row: Option<RoomRow> = sqlx::query_as(
            r"
            SELECT id, name, code, created_by, created_at
            FROM rooms
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Room::from))
    }

    /// Enroll a user in a room. Idempotent for existing members.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_member(&self, room_id: RoomId, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO room_members (room_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (room_id, user_id) DO NOTHING
            ",
        )
        .bind(room_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Whether a user is a member of a room.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_member(&self, room_id: RoomId, user_id: UserId) -> Result<bool, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"
            SELECT 1
            FROM room_members
            WHERE room_id = $1 AND user_id = $2
            ",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// The caller's rooms with list aggregates: member count, distinct
    /// products in the shared cart, and last chat activity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<RoomSummary>, RepositoryError> {
        let rows: Vec<RoomSummaryRow> = sqlx::query_as(
            r"
            SELECT r.id, r.name, r.code, r.created_by, r.created_at,
                   (SELECT COUNT(*) FROM room_members rm2
                     WHERE rm2.room_id = r.id)                      AS member_count,
                   (SELECT COUNT(*) FROM cart_items ci
                     JOIN carts c ON c.id = ci.cart_id
                     WHERE c.room_id = r.id)                        AS items_in_cart,
                   (SELECT MAX(m.created_at) FROM messages m
                     WHERE m.room_id = r.id)                        AS last_activity
            FROM rooms r
            JOIN room_members rm ON rm.room_id = r.id
            WHERE rm.user_id = $1
            ORDER BY r.created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(RoomSummary::from).collect())
    }
}
