//! Cart snapshot storage.
//!
//! This is the storage collaborator the cart engine is written against:
//! handlers load a snapshot, apply engine operations, and write the
//! result back here. The write is one transaction - absent lines are
//! deleted, present lines upserted, voter rows replaced - and resolves
//! concurrent writers last-write-wins, as the engine contract allows.
//!
//! Stable line-item IDs are assigned here at write-back; the engine
//! creates new lines under `LineItemId::PROVISIONAL`.

use sqlx::PgPool;

use shopsync_core::{
    Cart, CartContext, CartId, ChannelId, Contributor, CurrencyCode, LineItem, LineItemId, Price,
    ProductId, ProductRef, ReactionTally, RoomId, UserId, VoteTally,
};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    room_id: Option<RoomId>,
    channel_id: Option<ChannelId>,
}

impl CartRow {
    fn context(&self) -> Result<CartContext, RepositoryError> {
        match (self.room_id, self.channel_id) {
            (Some(room_id), None) => Ok(CartContext::Room(room_id)),
            (None, Some(channel_id)) => Ok(CartContext::Channel(channel_id)),
            _ => Err(RepositoryError::DataCorruption(format!(
                "cart {} violates the room/channel exclusivity constraint",
                self.id
            ))),
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: LineItemId,
    quantity: i32,
    added_by: Option<UserId>,
    added_by_name: Option<String>,
    added_by_avatar: Option<String>,
    up_votes: i32,
    down_votes: i32,
    likes: i32,
    hearts: i32,
    fire: i32,
    comments: i32,
    product_id: ProductId,
    product_name: String,
    brand: String,
    price_minor: i64,
    currency: String,
    image_url: String,
    purchase_url: String,
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    item_id: LineItemId,
    user_id: UserId,
    direction: String,
}

fn clamp_u32(value: i32) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(0)
}

/// Engine counters are u32; the columns are INTEGER.
fn db_count(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Repository for cart snapshots.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the cart for a context, materializing an empty one on first
    /// access. The cart then lives as long as its room or channel.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_or_create(&self, context: CartContext) -> Result<Cart, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO carts (room_id, channel_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(context.room_id())
        .bind(context.channel_id())
        .execute(self.pool)
        .await?;

        let row: CartRow = sqlx::query_as(
            r"
            SELECT id, room_id, channel_id
            FROM carts
            WHERE room_id IS NOT DISTINCT FROM $1
              AND channel_id IS NOT DISTINCT FROM $2
            ",
        )
        .bind(context.room_id())
        .bind(context.channel_id())
        .fetch_one(self.pool)
        .await?;

        self.load_items(row.id, context).await
    }

    /// Load a cart by its storage ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if the stored context is invalid.
    pub async fn get_by_id(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(
            r"
            SELECT id, room_id, channel_id
            FROM carts
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let context = row.context()?;
                Ok(Some(self.load_items(row.id, context).await?))
            }
            None => Ok(None),
        }
    }

    /// Write a cart snapshot back, then return the stored snapshot with
    /// stable IDs assigned to any provisional lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lines the engine removed are deleted; everything else is kept
        // and updated in place below.
        let kept: Vec<i32> = cart
            .items()
            .iter()
            .filter(|item| !item.id.is_provisional())
            .map(|item| item.id.as_i32())
            .collect();

        sqlx::query(
            r"
            DELETE FROM cart_items
            WHERE cart_id = $1 AND id <> ALL($2)
            ",
        )
        .bind(cart.id)
        .bind(&kept)
        .execute(&mut *tx)
        .await?;

        for item in cart.items() {
            let item_id = if item.id.is_provisional() {
                let (id,): (LineItemId,) = sqlx::query_as(
                    r"
                    INSERT INTO cart_items
                        (cart_id, product_id, quantity, added_by,
                         up_votes, down_votes, likes, hearts, fire, comments)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    ON CONFLICT (cart_id, product_id) DO UPDATE
                    SET quantity = EXCLUDED.quantity,
                        up_votes = EXCLUDED.up_votes,
                        down_votes = EXCLUDED.down_votes,
                        likes = EXCLUDED.likes,
                        hearts = EXCLUDED.hearts,
                        fire = EXCLUDED.fire,
                        comments = EXCLUDED.comments
                    RETURNING id
                    ",
                )
                .bind(cart.id)
                .bind(item.product.id)
                .bind(db_count(item.quantity()))
                .bind(item.added_by.as_ref().map(|c| c.id))
                .bind(db_count(item.votes.up))
                .bind(db_count(item.votes.down))
                .bind(db_count(item.reactions.likes))
                .bind(db_count(item.reactions.hearts))
                .bind(db_count(item.reactions.fire))
                .bind(db_count(item.reactions.comments))
                .fetch_one(&mut *tx)
                .await?;
                id
            } else {
                sqlx::query(
                    r"
                    UPDATE cart_items
                    SET quantity = $2, up_votes = $3, down_votes = $4,
                        likes = $5, hearts = $6, fire = $7, comments = $8
                    WHERE id = $1
                    ",
                )
                .bind(item.id)
                .bind(db_count(item.quantity()))
                .bind(db_count(item.votes.up))
                .bind(db_count(item.votes.down))
                .bind(db_count(item.reactions.likes))
                .bind(db_count(item.reactions.hearts))
                .bind(db_count(item.reactions.fire))
                .bind(db_count(item.reactions.comments))
                .execute(&mut *tx)
                .await?;
                item.id
            };

            sqlx::query("DELETE FROM cart_item_votes WHERE item_id = $1")
                .bind(item_id)
                .execute(&mut *tx)
                .await?;

            for (direction, voters) in [
                ("up", &item.votes.up_voters),
                ("down", &item.votes.down_voters),
            ] {
                for voter in voters {
                    sqlx::query(
                        r"
                        INSERT INTO cart_item_votes (item_id, user_id, direction)
                        VALUES ($1, $2, $3)
                        ON CONFLICT DO NOTHING
                        ",
                    )
                    .bind(item_id)
                    .bind(voter)
                    .bind(direction)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        sqlx::query("UPDATE carts SET updated_at = now() WHERE id = $1")
            .bind(cart.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.load_items(cart.id, cart.context).await
    }

    /// Load the line items of a cart, in insertion (line ID) order.
    async fn load_items(
        &self,
        cart_id: CartId,
        context: CartContext,
    ) -> Result<Cart, RepositoryError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(
            r"
            SELECT ci.id, ci.quantity, ci.added_by,
                   au.display_name AS added_by_name,
                   au.avatar       AS added_by_avatar,
                   ci.up_votes, ci.down_votes,
                   ci.likes, ci.hearts, ci.fire, ci.comments,
                   p.id   AS product_id,
                   p.name AS product_name,
                   p.brand, p.price_minor, p.currency,
                   p.image_url, p.purchase_url
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            LEFT JOIN users au ON au.id = ci.added_by
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        let votes: Vec<VoteRow> = sqlx::query_as(
            r"
            SELECT v.item_id, v.user_id, v.direction
            FROM cart_item_votes v
            JOIN cart_items ci ON ci.id = v.item_id
            WHERE ci.cart_id = $1
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let currency = CurrencyCode::from_code(&row.currency).ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "unknown currency code in database: {}",
                    row.currency
                ))
            })?;

            let product = ProductRef {
                id: row.product_id,
                name: row.product_name,
                brand: row.brand,
                unit_price: Price::from_minor_units(row.price_minor, currency),
                image_url: row.image_url,
                purchase_url: row.purchase_url,
            };

            let added_by = row.added_by.map(|id| Contributor {
                id,
                display_name: row.added_by_name.clone(),
                avatar: row.added_by_avatar.clone(),
            });

            let mut tally = VoteTally {
                up: clamp_u32(row.up_votes),
                down: clamp_u32(row.down_votes),
                ..VoteTally::default()
            };
            for vote in votes.iter().filter(|v| v.item_id == row.id) {
                match vote.direction.as_str() {
                    "up" => {
                        tally.up_voters.insert(vote.user_id);
                    }
                    "down" => {
                        tally.down_voters.insert(vote.user_id);
                    }
                    other => {
                        return Err(RepositoryError::DataCorruption(format!(
                            "unknown vote direction in database: {other}"
                        )));
                    }
                }
            }

            let reactions = ReactionTally {
                likes: clamp_u32(row.likes),
                hearts: clamp_u32(row.hearts),
                fire: clamp_u32(row.fire),
                comments: clamp_u32(row.comments),
            };

            let quantity = clamp_u32(row.quantity);
            items.push(LineItem::from_snapshot(
                row.id, product, quantity, added_by, tally, reactions,
            ));
        }

        Ok(Cart::with_items(cart_id, context, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_u32_floors_negative_counts() {
        assert_eq!(clamp_u32(-3), 0);
        assert_eq!(clamp_u32(7), 7);
    }

    #[test]
    fn test_db_count_saturates() {
        assert_eq!(db_count(3), 3);
        assert_eq!(db_count(u32::MAX), i32::MAX);
    }
}
