//! Line items and their vote/reaction tallies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::engine::EngineError;
use crate::types::{LineItemId, Price, ProductId, UserId};

/// Catalog data carried by a line item.
///
/// Supplied by the product catalog; the engine treats everything except
/// `id` and `unit_price` as opaque display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Catalog ID of the product.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Brand or source, e.g. "Zara".
    pub brand: String,
    /// Unit price in integer minor currency units.
    pub unit_price: Price,
    /// Product image URL.
    pub image_url: String,
    /// External purchase URL.
    pub purchase_url: String,
}

impl ProductRef {
    /// Check that all required fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingProductField`] naming the first empty
    /// required field.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::MissingProductField("name"));
        }
        if self.brand.trim().is_empty() {
            return Err(EngineError::MissingProductField("brand"));
        }
        if self.image_url.trim().is_empty() {
            return Err(EngineError::MissingProductField("image_url"));
        }
        if self.purchase_url.trim().is_empty() {
            return Err(EngineError::MissingProductField("purchase_url"));
        }
        Ok(())
    }
}

/// The user who added a line item to the cart.
///
/// Optional on a line item - community carts on brand channels have no
/// single contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// The contributor's user ID. The engine only ever compares this.
    pub id: UserId,
    /// Display name, if the user has set one.
    pub display_name: Option<String>,
    /// Avatar marker, e.g. an emoji.
    pub avatar: Option<String>,
}

/// Direction of a vote on a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

/// A reaction kind on a product line item.
///
/// Reactions are lightweight, repeatable signals - unlike votes there is
/// no per-user dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Heart,
    Fire,
}

/// Vote counters plus the per-direction voter sets that back them.
///
/// A voter appears at most once per direction; the counters only move when
/// the corresponding set changes. The two directions are independent - a
/// user may hold an up and a down vote simultaneously (see the engine docs
/// on retraction).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Up-vote count.
    pub up: u32,
    /// Down-vote count.
    pub down: u32,
    /// Users who have voted up.
    pub up_voters: BTreeSet<UserId>,
    /// Users who have voted down.
    pub down_voters: BTreeSet<UserId>,
}

impl VoteTally {
    /// Ranking score: up-votes minus down-votes.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.up as i64 - self.down as i64
    }

    /// Record a vote. Returns `false` (and leaves the counter untouched)
    /// when the voter already voted in this direction.
    pub(crate) fn cast(&mut self, direction: VoteDirection, voter: UserId) -> bool {
        let (count, voters) = self.side_mut(direction);
        if voters.insert(voter) {
            *count = count.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// Remove a vote. Returns `false` when the voter had not voted in this
    /// direction.
    pub(crate) fn retract(&mut self, direction: VoteDirection, voter: UserId) -> bool {
        let (count, voters) = self.side_mut(direction);
        if voters.remove(&voter) {
            *count = count.saturating_sub(1);
            true
        } else {
            false
        }
    }

    fn side_mut(&mut self, direction: VoteDirection) -> (&mut u32, &mut BTreeSet<UserId>) {
        match direction {
            VoteDirection::Up => (&mut self.up, &mut self.up_voters),
            VoteDirection::Down => (&mut self.down, &mut self.down_voters),
        }
    }
}

/// Per-kind reaction counters.
///
/// `comments` is a read-only passthrough from the chat layer; the engine
/// never mutates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTally {
    pub likes: u32,
    pub hearts: u32,
    pub fire: u32,
    pub comments: u32,
}

impl ReactionTally {
    pub(crate) fn bump(&mut self, kind: ReactionKind) {
        let counter = match kind {
            ReactionKind::Like => &mut self.likes,
            ReactionKind::Heart => &mut self.hearts,
            ReactionKind::Fire => &mut self.fire,
        };
        *counter = counter.saturating_add(1);
    }
}

/// One distinct product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Stable line-item ID, or [`LineItemId::PROVISIONAL`] until storage
    /// assigns one.
    pub id: LineItemId,
    /// The product this line refers to.
    pub product: ProductRef,
    /// Quantity, always >= 1 while the item exists.
    quantity: u32,
    /// Who added the item, when known.
    pub added_by: Option<Contributor>,
    /// Vote state.
    pub votes: VoteTally,
    /// Reaction state.
    pub reactions: ReactionTally,
}

impl LineItem {
    /// A fresh line item with quantity 1 and empty tallies.
    pub(crate) fn new(id: LineItemId, product: ProductRef, added_by: Option<Contributor>) -> Self {
        Self {
            id,
            product,
            quantity: 1,
            added_by,
            votes: VoteTally::default(),
            reactions: ReactionTally::default(),
        }
    }

    /// Rebuild a line item from a storage snapshot.
    ///
    /// Storage guarantees `quantity >= 1` via a CHECK constraint; a zero
    /// from a corrupt row is clamped rather than violating the engine
    /// invariant.
    #[must_use]
    pub fn from_snapshot(
        id: LineItemId,
        product: ProductRef,
        quantity: u32,
        added_by: Option<Contributor>,
        votes: VoteTally,
        reactions: ReactionTally,
    ) -> Self {
        Self {
            id,
            product,
            quantity: quantity.max(1),
            added_by,
            votes,
            reactions,
        }
    }

    /// Current quantity. Never zero.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Ranking score of this line: up-votes minus down-votes.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.votes.score()
    }

    /// Line value: unit price times quantity.
    #[must_use]
    pub const fn line_value(&self) -> Price {
        self.product.unit_price.line_value(self.quantity)
    }

    pub(crate) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Apply a signed delta. Returns the new quantity; `None` means the
    /// item dropped to zero or below and must be removed.
    pub(crate) fn apply_delta(&mut self, delta: i32) -> Option<u32> {
        let next = i64::from(self.quantity) + i64::from(delta);
        if next <= 0 {
            None
        } else {
            self.quantity = u32::try_from(next).unwrap_or(u32::MAX);
            Some(self.quantity)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::CurrencyCode;

    fn product() -> ProductRef {
        ProductRef {
            id: ProductId::new(1),
            name: "Oversized Wool Blazer".into(),
            brand: "Zara".into(),
            unit_price: Price::from_minor_units(4999, CurrencyCode::INR),
            image_url: "https://images.example.com/blazer.jpg".into(),
            purchase_url: "https://shop.example.com/blazer".into(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_product() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn test_validate_names_first_missing_field() {
        let mut p = product();
        p.brand = "  ".into();
        assert_eq!(
            p.validate(),
            Err(EngineError::MissingProductField("brand"))
        );
    }

    #[test]
    fn test_vote_tally_cast_and_retract() {
        let mut tally = VoteTally::default();
        assert!(tally.cast(VoteDirection::Up, UserId::new(1)));
        assert!(!tally.cast(VoteDirection::Up, UserId::new(1)));
        assert_eq!(tally.up, 1);

        assert!(tally.retract(VoteDirection::Up, UserId::new(1)));
        assert!(!tally.retract(VoteDirection::Up, UserId::new(1)));
        assert_eq!(tally.up, 0);
    }

    #[test]
    fn test_vote_directions_are_independent() {
        let mut tally = VoteTally::default();
        let alice = UserId::new(1);
        assert!(tally.cast(VoteDirection::Up, alice));
        assert!(tally.cast(VoteDirection::Down, alice));
        assert_eq!((tally.up, tally.down), (1, 1));
        assert_eq!(tally.score(), 0);
    }

    #[test]
    fn test_reaction_bump_leaves_comments_alone() {
        let mut tally = ReactionTally {
            comments: 4,
            ..ReactionTally::default()
        };
        tally.bump(ReactionKind::Like);
        tally.bump(ReactionKind::Fire);
        tally.bump(ReactionKind::Fire);
        assert_eq!(tally.likes, 1);
        assert_eq!(tally.fire, 2);
        assert_eq!(tally.hearts, 0);
        assert_eq!(tally.comments, 4);
    }

    #[test]
    fn test_from_snapshot_clamps_zero_quantity() {
        let item = LineItem::from_snapshot(
            LineItemId::new(1),
            product(),
            0,
            None,
            VoteTally::default(),
            ReactionTally::default(),
        );
        assert_eq!(item.quantity(), 1);
    }

    #[test]
    fn test_line_value() {
        let mut item = LineItem::new(LineItemId::new(1), product(), None);
        item.increment();
        assert_eq!(item.line_value().minor_units(), 9998);
    }
}
