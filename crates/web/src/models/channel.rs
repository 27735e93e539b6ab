//! Brand-channel domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopsync_core::{ChannelId, ReactionTally};

use super::product::Product;

/// A public brand channel.
#[derive(Debug, Clone, Serialize)]
pub struct Channel {
    /// Unique channel ID.
    pub id: ChannelId,
    /// URL slug, e.g. "zara".
    pub slug: String,
    /// Display name, e.g. "Zara".
    pub name: String,
    /// Logo marker (an emoji in the current UI).
    pub logo: String,
    /// Category, e.g. "Fashion".
    pub category: String,
    /// One-line description.
    pub description: String,
    /// When the channel was created.
    pub created_at: DateTime<Utc>,
}

/// A channel plus the aggregates shown in the directory.
///
/// The directory is ordered by `trending_score` descending; the score is
/// maintained by the seeding/ops tooling, not computed per request.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    #[serde(flatten)]
    pub channel: Channel,
    /// Number of members.
    pub member_count: i64,
    /// Items trending this week.
    pub trending_score: i32,
}

/// A product in a channel's feed with its reaction tallies.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelProduct {
    #[serde(flatten)]
    pub product: Product,
    /// Reaction counters for this product in this channel.
    pub reactions: ReactionTally,
}
