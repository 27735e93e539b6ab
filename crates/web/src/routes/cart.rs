//! Shared-cart route handlers.
//!
//! Every mutation here follows the same shape: load the cart snapshot
//! from storage, apply one engine operation to the in-memory value, write
//! the snapshot back, and respond with the derived view models (totals
//! and the top-voted items). Concurrent writers race last-write-wins at
//! the storage layer; the engine itself is a pure value transformation.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shopsync_core::{
    Cart, CartContext, CartId, ChannelId, Contributor, LineItem, LineItemId, ProductId,
    ReactionKind, ReactionTally, RoomId, VoteDirection,
};

use crate::db::{CartRepository, MessageRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalUser, RequireUser};
use crate::models::{CurrentUser, MessageKind};
use crate::state::AppState;

/// How many top-voted items the cart view carries.
const TOP_ITEMS_LIMIT: usize = 3;

// =============================================================================
// View models
// =============================================================================

/// Product display data inside a line item.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price_minor: i64,
    pub currency: String,
    pub price_display: String,
    pub image_url: String,
    pub purchase_url: String,
}

/// Vote display data: counters plus the derived score.
#[derive(Debug, Clone, Serialize)]
pub struct VoteView {
    pub up: u32,
    pub down: u32,
    pub score: i64,
}

/// Line-item display data.
#[derive(Debug, Clone, Serialize)]
pub struct LineItemView {
    pub id: LineItemId,
    pub product: ProductView,
    pub quantity: u32,
    pub line_value_minor: i64,
    pub line_value_display: String,
    pub added_by: Option<Contributor>,
    pub votes: VoteView,
    pub reactions: ReactionTally,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        let price = item.product.unit_price;
        let line_value = item.line_value();

        Self {
            id: item.id,
            product: ProductView {
                id: item.product.id,
                name: item.product.name.clone(),
                brand: item.product.brand.clone(),
                price_minor: price.minor_units(),
                currency: price.currency().code().to_string(),
                price_display: price.display(),
                image_url: item.product.image_url.clone(),
                purchase_url: item.product.purchase_url.clone(),
            },
            quantity: item.quantity(),
            line_value_minor: line_value.minor_units(),
            line_value_display: line_value.display(),
            added_by: item.added_by.clone(),
            votes: VoteView {
                up: item.votes.up,
                down: item.votes.down,
                score: item.score(),
            },
            reactions: item.reactions,
        }
    }
}

/// Totals display data.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub total_value_minor: i64,
    pub total_value_display: String,
    pub total_item_count: u64,
    pub distinct_product_count: usize,
}

/// Cart display data: items in insertion order, derived totals, and the
/// top-voted items.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub room_id: Option<RoomId>,
    pub channel_id: Option<ChannelId>,
    pub items: Vec<LineItemView>,
    pub totals: TotalsView,
    pub top_items: Vec<LineItemView>,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();

        Self {
            id: cart.id,
            room_id: cart.context.room_id(),
            channel_id: cart.context.channel_id(),
            items: cart.items().iter().map(LineItemView::from).collect(),
            totals: TotalsView {
                total_value_minor: totals.total_value.minor_units(),
                total_value_display: totals.total_value.display(),
                total_item_count: totals.total_item_count,
                distinct_product_count: totals.distinct_product_count,
            },
            top_items: cart
                .rank_by_score(TOP_ITEMS_LIMIT)
                .map(LineItemView::from)
                .collect(),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Query selecting the cart's owning context.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub room_id: Option<i32>,
    pub channel_id: Option<i32>,
}

/// Request to add a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
}

/// Request to change a line item's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    /// Signed delta; a result of zero or below removes the line.
    pub delta: i32,
}

/// Request to vote on a line item.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
    /// Retract the vote instead of casting it.
    #[serde(default)]
    pub retract: bool,
}

/// Request to react to a line item.
#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub kind: ReactionKind,
}

// =============================================================================
// Helpers
// =============================================================================

/// Room carts are members-only; channel carts are community-writable by
/// anyone with an identity.
async fn authorize(state: &AppState, context: CartContext, current: &CurrentUser) -> Result<()> {
    match context {
        CartContext::Room(room_id) => {
            super::rooms::require_membership(state, room_id, current.id).await
        }
        CartContext::Channel(_) => Ok(()),
    }
}

/// Load a cart by path ID and check the caller may touch it.
async fn load_authorized(state: &AppState, id: i32, current: &CurrentUser) -> Result<Cart> {
    let cart_id = CartId::new(id);
    let cart = CartRepository::new(state.pool())
        .get_by_id(cart_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cart {cart_id}")))?;

    authorize(state, cart.context, current).await?;
    Ok(cart)
}

/// The contributor identity recorded on lines the caller adds.
async fn contributor(state: &AppState, current: &CurrentUser) -> Result<Contributor> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?;

    Ok(user.map_or_else(
        || Contributor {
            id: current.id,
            display_name: current.display_name.clone(),
            avatar: None,
        },
        |user| Contributor {
            id: user.id,
            display_name: user.display_name,
            avatar: user.avatar,
        },
    ))
}

// =============================================================================
// Handlers
// =============================================================================

/// The cart for a room or channel, materialized lazily on first access.
///
/// GET /api/carts?room_id= XOR ?channel_id=
///
/// Channel carts are publicly readable; room carts need a member
/// identity.
///
/// # Errors
///
/// Returns `AppError::BadRequest` unless exactly one of `room_id` and
/// `channel_id` is given.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartView>> {
    let context = match (query.room_id, query.channel_id) {
        (Some(room_id), None) => CartContext::Room(RoomId::new(room_id)),
        (None, Some(channel_id)) => CartContext::Channel(ChannelId::new(channel_id)),
        _ => {
            return Err(AppError::BadRequest(
                "exactly one of room_id and channel_id must be given".into(),
            ));
        }
    };

    match context {
        CartContext::Room(_) => {
            let current = current.ok_or_else(|| {
                AppError::Unauthorized("room carts need an identity".into())
            })?;
            authorize(&state, context, &current).await?;
        }
        CartContext::Channel(channel_id) => {
            // Materializing a cart for a channel that does not exist
            // would trip the foreign key; 404 instead.
            crate::db::ChannelRepository::new(state.pool())
                .get_by_id(channel_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("channel {channel_id}")))?;
        }
    }

    let cart = CartRepository::new(state.pool())
        .find_or_create(context)
        .await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a product to the cart, or bump its quantity if already present.
///
/// POST /api/carts/{id}/items
///
/// Also posts a system line to the owning room's chat, like the original
/// "Mike added the Oversized Wool Blazer to the shared cart".
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an unknown product.
#[instrument(skip(state, body))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(id): Path<i32>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_authorized(&state, id, &current).await?;

    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("unknown product {}", body.product_id)))?;

    let added_by = contributor(&state, &current).await?;
    let contributor_name = added_by
        .display_name
        .clone()
        .unwrap_or_else(|| "Someone".to_string());

    cart.add_or_increment(product.to_ref(), Some(added_by), LineItemId::PROVISIONAL)?;
    let stored = CartRepository::new(state.pool()).save(&cart).await?;

    if let Some(room_id) = stored.context.room_id() {
        let content = format!("{contributor_name} added {} to the shared cart", product.name);
        MessageRepository::new(state.pool())
            .create(room_id, None, MessageKind::System, &content, Some(product.id))
            .await?;
    }

    Ok(Json(CartView::from(&stored)))
}

/// Apply a signed quantity delta to a line item.
///
/// PATCH /api/carts/{id}/items/{item_id}
///
/// A delta that drives the quantity to zero or below removes the line;
/// unknown item IDs are a no-op so retries stay idempotent.
#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path((id, item_id)): Path<(i32, i32)>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_authorized(&state, id, &current).await?;

    cart.change_quantity(LineItemId::new(item_id), body.delta);
    let stored = CartRepository::new(state.pool()).save(&cart).await?;

    Ok(Json(CartView::from(&stored)))
}

/// Remove a line item outright.
///
/// DELETE /api/carts/{id}/items/{item_id}
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path((id, item_id)): Path<(i32, i32)>,
) -> Result<Json<CartView>> {
    let mut cart = load_authorized(&state, id, &current).await?;

    cart.remove_item(LineItemId::new(item_id));
    let stored = CartRepository::new(state.pool()).save(&cart).await?;

    Ok(Json(CartView::from(&stored)))
}

/// Cast or retract a vote on a line item.
///
/// POST /api/carts/{id}/items/{item_id}/votes
///
/// At most one vote per caller per direction; duplicate casts are no-ops.
/// Directions are independent - switching sides means retracting the old
/// direction and casting the new one.
#[instrument(skip(state, body))]
pub async fn vote(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path((id, item_id)): Path<(i32, i32)>,
    Json(body): Json<VoteRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_authorized(&state, id, &current).await?;

    let item_id = LineItemId::new(item_id);
    if body.retract {
        cart.retract_vote(item_id, body.direction, current.id);
    } else {
        cart.cast_vote(item_id, body.direction, current.id);
    }
    let stored = CartRepository::new(state.pool()).save(&cart).await?;

    Ok(Json(CartView::from(&stored)))
}

/// Bump a reaction counter on a line item.
///
/// POST /api/carts/{id}/items/{item_id}/reactions
#[instrument(skip(state, body))]
pub async fn react(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path((id, item_id)): Path<(i32, i32)>,
    Json(body): Json<ReactRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_authorized(&state, id, &current).await?;

    cart.add_reaction(LineItemId::new(item_id), body.kind);
    let stored = CartRepository::new(state.pool()).save(&cart).await?;

    Ok(Json(CartView::from(&stored)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_core::{CurrencyCode, Price, ProductRef};

    fn cart_with_item() -> Cart {
        let mut cart = Cart::new(CartId::new(1), CartContext::Room(RoomId::new(1)));
        cart.add_or_increment(
            ProductRef {
                id: ProductId::new(1),
                name: "Classic White Sneakers".into(),
                brand: "Nike".into(),
                unit_price: Price::from_minor_units(7299, CurrencyCode::INR),
                image_url: "https://images.example.com/sneakers.jpg".into(),
                purchase_url: "https://shop.example.com/sneakers".into(),
            },
            None,
            LineItemId::new(1),
        )
        .expect("valid product");
        cart
    }

    #[test]
    fn test_cart_view_totals_and_context() {
        let view = CartView::from(&cart_with_item());

        assert_eq!(view.room_id, Some(RoomId::new(1)));
        assert_eq!(view.channel_id, None);
        assert_eq!(view.totals.total_value_minor, 7299);
        assert_eq!(view.totals.total_item_count, 1);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.top_items.len(), 1);
    }

    #[test]
    fn test_line_item_view_carries_display_price() {
        let view = CartView::from(&cart_with_item());
        let item = view.items.first().expect("one item");

        assert_eq!(item.product.price_display, "₹72.99");
        assert_eq!(item.line_value_minor, 7299);
        assert_eq!(item.votes.score, 0);
    }
}
