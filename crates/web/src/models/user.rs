//! User domain types.
//!
//! ShopSync users are anonymous visitor identities - a row created on
//! first visit and pinned to the browser session. There are no
//! credentials; authentication is explicitly out of scope.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopsync_core::UserId;

/// A ShopSync user (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Self-chosen display name, if any.
    pub display_name: Option<String>,
    /// Avatar marker (an emoji in the current UI).
    pub avatar: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
