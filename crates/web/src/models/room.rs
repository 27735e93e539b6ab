//! Private-room domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopsync_core::{RoomCode, RoomId, UserId};

/// A private shopping room.
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    /// Unique room ID.
    pub id: RoomId,
    /// Room name, e.g. "Weekend Shopping Crew".
    pub name: String,
    /// Join code shared with friends.
    pub code: RoomCode,
    /// Creator, if the account still exists.
    pub created_by: Option<UserId>,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
}

/// A room plus the aggregates shown on the room list.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    #[serde(flatten)]
    pub room: Room,
    /// Number of members.
    pub member_count: i64,
    /// Distinct products currently in the shared cart.
    pub items_in_cart: i64,
    /// Timestamp of the latest chat message, if any.
    pub last_activity: Option<DateTime<Utc>>,
}
