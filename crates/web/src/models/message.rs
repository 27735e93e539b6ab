//! Chat message domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopsync_core::{MessageId, ProductId, RoomId, UserId};

/// Kind of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain text from a user.
    Text,
    /// A shared product card.
    Product,
    /// Generated by the application, e.g. "Mike added X to the cart".
    System,
}

impl MessageKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Product => "product",
            Self::System => "system",
        }
    }

    /// Parse the storage representation.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "product" => Some(Self::Product),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// A chat message in a room.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Unique message ID.
    pub id: MessageId,
    /// Room this message belongs to.
    pub room_id: RoomId,
    /// Author; `None` for system messages.
    pub user_id: Option<UserId>,
    /// Author display name at read time.
    pub user_display_name: Option<String>,
    /// Author avatar marker.
    pub user_avatar: Option<String>,
    /// Message kind.
    pub kind: MessageKind,
    /// Text content.
    pub content: String,
    /// Attached product for `Product` messages.
    pub product_id: Option<ProductId>,
    /// Like reactions (no per-user dedup, same rule as cart reactions).
    pub likes: i32,
    /// Heart reactions.
    pub hearts: i32,
    /// When the message was posted.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kind_round_trip() {
        for kind in [MessageKind::Text, MessageKind::Product, MessageKind::System] {
            assert_eq!(MessageKind::from_str_opt(kind.as_str()), Some(kind));
        }
        assert_eq!(MessageKind::from_str_opt("video"), None);
    }
}
