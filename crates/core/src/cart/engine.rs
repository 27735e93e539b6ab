//! The cart aggregation engine.
//!
//! Owns the invariants of a cart's line-item collection and derives totals
//! and rankings from it. Every operation is a pure, synchronous
//! transformation of a caller-owned [`Cart`]; the engine performs no I/O
//! and holds no locks. Callers that race each other on independently
//! loaded snapshots resolve last-write-wins at the storage layer.
//!
//! Misuse by an unreliable caller is deliberately forgiving: operations on
//! unknown line-item IDs and duplicate votes are no-ops, not errors. The
//! only signalled failures are programming contract violations (a
//! malformed product reference).

use serde::{Deserialize, Serialize};

use super::item::{Contributor, LineItem, ProductRef, ReactionKind, VoteDirection};
use crate::types::{CartId, ChannelId, CurrencyCode, LineItemId, Price, RoomId, UserId};

/// Contract violations signalled by the engine.
///
/// Transient failures (network, storage) never originate here; they belong
/// to the storage adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A product reference was missing a required field when creating a
    /// new line item.
    #[error("product reference is missing required field `{0}`")]
    MissingProductField(&'static str),
}

/// The context that owns a cart: a private room or a public brand channel.
///
/// Exactly one of the two, by construction - a cart can never point at
/// both, and never at neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartContext {
    /// Cart shared within a private room.
    Room(RoomId),
    /// Community cart on a public brand channel.
    Channel(ChannelId),
}

impl CartContext {
    /// The room ID, for room carts.
    #[must_use]
    pub const fn room_id(&self) -> Option<RoomId> {
        match self {
            Self::Room(id) => Some(*id),
            Self::Channel(_) => None,
        }
    }

    /// The channel ID, for channel carts.
    #[must_use]
    pub const fn channel_id(&self) -> Option<ChannelId> {
        match self {
            Self::Room(_) => None,
            Self::Channel(id) => Some(*id),
        }
    }
}

/// Values derived from a cart's line items. Never stored - always
/// recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of `unit_price * quantity` over all lines, in minor units.
    pub total_value: Price,
    /// Sum of quantities.
    pub total_item_count: u64,
    /// Number of distinct line items.
    pub distinct_product_count: usize,
}

/// A shared cart: an ordered collection of line items scoped to one
/// context.
///
/// Line items keep insertion order; ranking ties break on that order, so
/// the collection itself is the tie-break state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Storage ID of this cart.
    pub id: CartId,
    /// Owning room or channel.
    pub context: CartContext,
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart for the given context.
    #[must_use]
    pub const fn new(id: CartId, context: CartContext) -> Self {
        Self {
            id,
            context,
            items: Vec::new(),
        }
    }

    /// Rebuild a cart from a storage snapshot. Items must be in insertion
    /// order (the storage adapter orders by line-item ID).
    #[must_use]
    pub const fn with_items(id: CartId, context: CartContext, items: Vec<LineItem>) -> Self {
        Self { id, context, items }
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line item by ID.
    #[must_use]
    pub fn item(&self, item_id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Add a product to the cart, or bump its quantity if a line for the
    /// same product already exists.
    ///
    /// No two lines in a cart ever reference the same product. A new line
    /// starts at quantity 1 with empty vote and reaction tallies and is
    /// created under `line_id` (typically [`LineItemId::PROVISIONAL`];
    /// storage assigns the stable ID at write-back).
    ///
    /// Returns the ID of the affected line.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingProductField`] if `product` is
    /// malformed and no existing line matches it.
    pub fn add_or_increment(
        &mut self,
        product: ProductRef,
        added_by: Option<Contributor>,
        line_id: LineItemId,
    ) -> Result<LineItemId, EngineError> {
        if let Some(existing) = self.items.iter_mut().find(|item| item.product.id == product.id) {
            existing.increment();
            return Ok(existing.id);
        }
        product.validate()?;
        self.items.push(LineItem::new(line_id, product, added_by));
        Ok(line_id)
    }

    /// Apply a signed quantity delta to a line item.
    ///
    /// A result of zero or below removes the line entirely - quantity is
    /// never kept at zero or negative. Unknown IDs are a no-op so that
    /// retries against a stale snapshot stay idempotent.
    pub fn change_quantity(&mut self, item_id: LineItemId, delta: i32) {
        let Some(index) = self.items.iter().position(|item| item.id == item_id) else {
            return;
        };
        if let Some(item) = self.items.get_mut(index) {
            if item.apply_delta(delta).is_none() {
                self.items.remove(index);
            }
        }
    }

    /// Remove a line item. No-op when absent.
    pub fn remove_item(&mut self, item_id: LineItemId) {
        self.items.retain(|item| item.id != item_id);
    }

    /// Record a vote on a line item.
    ///
    /// At most one vote per voter per direction; repeat casts are no-ops.
    /// The opposite direction is untouched - a voter switching sides must
    /// [`retract_vote`](Self::retract_vote) the old direction themselves.
    pub fn cast_vote(&mut self, item_id: LineItemId, direction: VoteDirection, voter: UserId) {
        if let Some(item) = self.item_mut(item_id) {
            item.votes.cast(direction, voter);
        }
    }

    /// Remove a voter's vote in one direction. No-op when the voter had
    /// not voted that way, or the item is unknown.
    pub fn retract_vote(&mut self, item_id: LineItemId, direction: VoteDirection, voter: UserId) {
        if let Some(item) = self.item_mut(item_id) {
            item.votes.retract(direction, voter);
        }
    }

    /// Bump a reaction counter on a line item. Reactions carry no per-user
    /// dedup; repeat reactions all count.
    pub fn add_reaction(&mut self, item_id: LineItemId, kind: ReactionKind) {
        if let Some(item) = self.item_mut(item_id) {
            item.reactions.bump(kind);
        }
    }

    /// The top `limit` line items by score (up-votes minus down-votes),
    /// descending.
    ///
    /// Ties break on insertion order - first added wins - and the ordering
    /// is deterministic across calls. The iterator is lazy over a
    /// precomputed ranking and can be restarted by calling again.
    pub fn rank_by_score(&self, limit: usize) -> impl Iterator<Item = &LineItem> {
        let mut ranked: Vec<&LineItem> = self.items.iter().collect();
        // Stable sort: equal scores keep insertion order.
        ranked.sort_by_key(|item| std::cmp::Reverse(item.score()));
        ranked.into_iter().take(limit)
    }

    /// Fold the line items into totals.
    ///
    /// Pure integer arithmetic over minor units. A cart holds one
    /// currency; an empty cart reports zero in the default currency.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let currency = self
            .items
            .first()
            .map_or(CurrencyCode::default(), |item| {
                item.product.unit_price.currency()
            });

        let mut total_value = Price::zero(currency);
        let mut total_item_count: u64 = 0;
        for item in &self.items {
            total_value = total_value.saturating_add(item.line_value());
            total_item_count += u64::from(item.quantity());
        }

        CartTotals {
            total_value,
            total_item_count,
            distinct_product_count: self.items.len(),
        }
    }

    fn item_mut(&mut self, item_id: LineItemId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn product(id: i32, minor_units: i64) -> ProductRef {
        ProductRef {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            brand: "Zara".into(),
            unit_price: Price::from_minor_units(minor_units, CurrencyCode::INR),
            image_url: format!("https://images.example.com/{id}.jpg"),
            purchase_url: format!("https://shop.example.com/{id}"),
        }
    }

    fn room_cart() -> Cart {
        Cart::new(CartId::new(1), CartContext::Room(RoomId::new(10)))
    }

    /// Adds `product(id, minor)` and returns the stable line ID it was
    /// given.
    fn add(cart: &mut Cart, id: i32, minor_units: i64) -> LineItemId {
        cart.add_or_increment(product(id, minor_units), None, LineItemId::new(id))
            .unwrap()
    }

    #[test]
    fn test_add_twice_yields_one_line_with_quantity_two() {
        let mut cart = room_cart();
        add(&mut cart, 1, 499);
        let id = add(&mut cart, 1, 499);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item(id).unwrap().quantity(), 2);
    }

    #[test]
    fn test_add_rejects_malformed_product() {
        let mut cart = room_cart();
        let mut p = product(1, 499);
        p.image_url.clear();

        assert_eq!(
            cart.add_or_increment(p, None, LineItemId::PROVISIONAL),
            Err(EngineError::MissingProductField("image_url"))
        );
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_increment_skips_validation_for_existing_line() {
        // A snapshot loaded from storage is trusted; adding the same
        // product again only bumps quantity and never re-validates.
        let mut cart = room_cart();
        add(&mut cart, 1, 499);
        let mut p = product(1, 499);
        p.brand.clear();

        let id = cart
            .add_or_increment(p, None, LineItemId::PROVISIONAL)
            .unwrap();
        assert_eq!(cart.item(id).unwrap().quantity(), 2);
    }

    #[test]
    fn test_quantity_never_reaches_zero() {
        let mut cart = room_cart();
        let id = add(&mut cart, 1, 499);

        cart.change_quantity(id, 3);
        assert_eq!(cart.item(id).unwrap().quantity(), 4);

        cart.change_quantity(id, -2);
        assert_eq!(cart.item(id).unwrap().quantity(), 2);

        // Dropping to zero or below removes the line entirely.
        cart.change_quantity(id, -5);
        assert!(cart.item(id).is_none());
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_change_quantity_unknown_id_is_noop() {
        let mut cart = room_cart();
        add(&mut cart, 1, 499);
        cart.change_quantity(LineItemId::new(99), -1);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = room_cart();
        let first = add(&mut cart, 1, 499);
        add(&mut cart, 2, 999);

        cart.remove_item(first);
        assert_eq!(cart.items().len(), 1);

        // Absent ID: no-op.
        cart.remove_item(first);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_vote_is_idempotent_per_voter_direction() {
        let mut cart = room_cart();
        let id = add(&mut cart, 1, 499);
        let alice = UserId::new(1);

        cart.cast_vote(id, VoteDirection::Up, alice);
        cart.cast_vote(id, VoteDirection::Up, alice);

        assert_eq!(cart.item(id).unwrap().votes.up, 1);
    }

    #[test]
    fn test_vote_does_not_auto_retract_opposite_direction() {
        let mut cart = room_cart();
        let id = add(&mut cart, 1, 499);
        let alice = UserId::new(1);

        cart.cast_vote(id, VoteDirection::Up, alice);
        cart.cast_vote(id, VoteDirection::Down, alice);

        let votes = &cart.item(id).unwrap().votes;
        assert_eq!((votes.up, votes.down), (1, 1));

        // A caller implementing exclusive voting retracts the old side.
        cart.retract_vote(id, VoteDirection::Up, alice);
        let votes = &cart.item(id).unwrap().votes;
        assert_eq!((votes.up, votes.down), (0, 1));
    }

    #[test]
    fn test_reactions_accumulate_without_dedup() {
        let mut cart = room_cart();
        let id = add(&mut cart, 1, 499);

        cart.add_reaction(id, ReactionKind::Fire);
        cart.add_reaction(id, ReactionKind::Fire);
        cart.add_reaction(id, ReactionKind::Heart);

        let reactions = cart.item(id).unwrap().reactions;
        assert_eq!(reactions.fire, 2);
        assert_eq!(reactions.hearts, 1);
        assert_eq!(reactions.comments, 0);
    }

    #[test]
    fn test_rank_by_score_orders_descending() {
        let mut cart = room_cart();
        let low = add(&mut cart, 1, 499);
        let high = add(&mut cart, 2, 999);
        let mid = add(&mut cart, 3, 1499);

        for voter in 1..=3 {
            cart.cast_vote(high, VoteDirection::Up, UserId::new(voter));
        }
        cart.cast_vote(mid, VoteDirection::Up, UserId::new(1));
        cart.cast_vote(low, VoteDirection::Down, UserId::new(2));

        let ranked: Vec<LineItemId> = cart.rank_by_score(3).map(|item| item.id).collect();
        assert_eq!(ranked, vec![high, mid, low]);
    }

    #[test]
    fn test_rank_by_score_tie_breaks_on_insertion_order() {
        let mut cart = room_cart();
        let first = add(&mut cart, 1, 499);
        let second = add(&mut cart, 2, 999);
        let third = add(&mut cart, 3, 1499);

        // All scores equal: insertion order must win, on every call.
        for _ in 0..3 {
            let ranked: Vec<LineItemId> = cart.rank_by_score(3).map(|item| item.id).collect();
            assert_eq!(ranked, vec![first, second, third]);
        }
    }

    #[test]
    fn test_rank_by_score_respects_limit_and_restarts() {
        let mut cart = room_cart();
        add(&mut cart, 1, 499);
        add(&mut cart, 2, 999);
        add(&mut cart, 3, 1499);

        assert_eq!(cart.rank_by_score(2).count(), 2);
        assert_eq!(cart.rank_by_score(0).count(), 0);
        assert_eq!(cart.rank_by_score(10).count(), 3);
    }

    #[test]
    fn test_totals_minor_unit_round_trip() {
        let mut cart = room_cart();
        let first = add(&mut cart, 1, 499);
        cart.change_quantity(first, 1);
        add(&mut cart, 2, 999);

        let totals = cart.totals();
        assert_eq!(totals.total_value.minor_units(), 1997);
        assert_eq!(totals.total_item_count, 3);
        assert_eq!(totals.distinct_product_count, 2);
    }

    #[test]
    fn test_totals_are_additive() {
        let mut cart = room_cart();
        add(&mut cart, 1, 499);
        let before = cart.totals();

        add(&mut cart, 2, 250);
        let after = cart.totals();

        assert_eq!(
            after.total_value.minor_units(),
            before.total_value.minor_units() + 250
        );
        assert_eq!(after.total_item_count, before.total_item_count + 1);
    }

    #[test]
    fn test_add_then_decrement_returns_to_empty() {
        let mut cart = room_cart();
        let id = cart
            .add_or_increment(product(1, 499), None, LineItemId::PROVISIONAL)
            .unwrap();
        cart.change_quantity(id, -1);

        assert!(cart.items().is_empty());
        let totals = cart.totals();
        assert_eq!(totals.total_value.minor_units(), 0);
        assert_eq!(totals.total_item_count, 0);
        assert_eq!(totals.distinct_product_count, 0);
    }

    #[test]
    fn test_context_accessors_are_exclusive() {
        let room = CartContext::Room(RoomId::new(1));
        assert_eq!(room.room_id(), Some(RoomId::new(1)));
        assert_eq!(room.channel_id(), None);

        let channel = CartContext::Channel(ChannelId::new(2));
        assert_eq!(channel.room_id(), None);
        assert_eq!(channel.channel_id(), Some(ChannelId::new(2)));
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let mut cart = room_cart();
        add(&mut cart, 1, 499);
        add(&mut cart, 2, 999);

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
