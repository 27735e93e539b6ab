//! Channel repository for database operations.
//!
//! Channels are public: the directory and product feeds need no
//! membership check. Joining only bumps the member roster.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopsync_core::{ChannelId, ProductId, ReactionKind, ReactionTally, UserId};

use super::RepositoryError;
use crate::models::{Channel, ChannelProduct, ChannelSummary};

#[derive(sqlx::FromRow)]
struct ChannelRow {
    id: ChannelId,
    slug: String,
    name: String,
    logo: String,
    category: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl From<ChannelRow> for Channel {
    fn from(row: ChannelRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            logo: row.logo,
            category: row.category,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChannelSummaryRow {
    id: ChannelId,
    slug: String,
    name: String,
    logo: String,
    category: String,
    description: String,
    created_at: DateTime<Utc>,
    member_count: i64,
    trending_score: i32,
}

impl From<ChannelSummaryRow> for ChannelSummary {
    fn from(row: ChannelSummaryRow) -> Self {
        Self {
            channel: Channel {
                id: row.id,
                slug: row.slug,
                name: row.name,
                logo: row.logo,
                category: row.category,
                description: row.description,
                created_at: row.created_at,
            },
            member_count: row.member_count,
            trending_score: row.trending_score,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChannelProductRow {
    id: ProductId,
    name: String,
    brand: String,
    price_minor: i64,
    currency: String,
    image_url: String,
    purchase_url: String,
    category: String,
    rating: f64,
    review_count: i32,
    likes: i32,
    hearts: i32,
    fire: i32,
    comments: i32,
}

/// Repository for channel database operations.
pub struct ChannelRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChannelRepository<'a> {
    /// Create a new channel repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The channel directory, ordered by trending score descending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ChannelSummary>, RepositoryError> {
        let rows: Vec<ChannelSummaryRow> = sqlx::query_as(
            r"
            SELECT ch.id, ch.slug, ch.name, ch.logo, ch.category,
                   ch.description, ch.created_at, ch.trending_score,
                   (SELECT COUNT(*) FROM channel_members cm
                     WHERE cm.channel_id = ch.id) AS member_count
            FROM channels ch
            ORDER BY ch.trending_score DESC, ch.name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ChannelSummary::from).collect())
    }

    /// Look up a channel by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ChannelId) -> Result<Option<Channel>, RepositoryError> {
        let row: Option<ChannelRow> = sqlx::query_as(
            r"
            SELECT id, slug, name, logo, category, description, created_at
            FROM channels
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Channel::from))
    }

    /// Look up a channel by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Channel>, RepositoryError> {
        let row: Option<ChannelRow> = sqlx::query_as(
            r"
            SELECT id, slug, name, logo, category, description, created_at
            FROM channels
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Channel::from))
    }

    /// Enroll a user in a channel. Idempotent for existing members.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_member(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO channel_members (channel_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (channel_id, user_id) DO NOTHING
            ",
        )
        .bind(channel_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// The channel's product feed with per-channel reaction tallies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown currency code.
    pub async fn products(
        &self,
        channel_id: ChannelId,
    ) -> Result<Vec<ChannelProduct>, RepositoryError> {
        let rows: Vec<ChannelProductRow> = sqlx::query_as(
            r"
            SELECT p.id, p.name, p.brand, p.price_minor, p.currency,
                   p.image_url, p.purchase_url, p.category, p.rating,
                   p.review_count,
                   COALESCE(pr.likes, 0)    AS likes,
                   COALESCE(pr.hearts, 0)   AS hearts,
                   COALESCE(pr.fire, 0)     AS fire,
                   COALESCE(pr.comments, 0) AS comments
            FROM products p
            JOIN channel_products cp ON cp.product_id = p.id
            LEFT JOIN product_reactions pr
              ON pr.channel_id = cp.channel_id AND pr.product_id = p.id
            WHERE cp.channel_id = $1
            ORDER BY p.id
            ",
        )
        .bind(channel_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let reactions = ReactionTally {
                    likes: u32::try_from(row.likes.max(0)).unwrap_or(0),
                    hearts: u32::try_from(row.hearts.max(0)).unwrap_or(0),
                    fire: u32::try_from(row.fire.max(0)).unwrap_or(0),
                    comments: u32::try_from(row.comments.max(0)).unwrap_or(0),
                };
                let product = super::products::product_from_parts(
                    row.id,
                    row.name,
                    row.brand,
                    row.price_minor,
                    &row.currency,
                    row.image_url,
                    row.purchase_url,
                    row.category,
                    row.rating,
                    row.review_count,
                )?;
                Ok(ChannelProduct { product, reactions })
            })
            .collect()
    }

    /// Bump a reaction counter for a product in a channel.
    ///
    /// No per-user dedup, matching the engine's reaction rule.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_product_reaction(
        &self,
        channel_id: ChannelId,
        product_id: ProductId,
        kind: ReactionKind,
    ) -> Result<(), RepositoryError> {
        let column = match kind {
            ReactionKind::Like => "likes",
            ReactionKind::Heart => "hearts",
            ReactionKind::Fire => "fire",
        };

        // `column` comes from the match above, never from user input.
        let sql = format!(
            r"
            INSERT INTO product_reactions (channel_id, product_id, {column})
            VALUES ($1, $2, 1)
            ON CONFLICT (channel_id, product_id)
            DO UPDATE SET {column} = product_reactions.{column} + 1
            "
        );

        sqlx::query(&sql)
            .bind(channel_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
