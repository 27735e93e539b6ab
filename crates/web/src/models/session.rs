//! Session-related types.
//!
//! Types stored in the session to pin the anonymous visitor to their user
//! row across requests.

use serde::{Deserialize, Serialize};

use shopsync_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the current visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Display name at the time the session was written (refreshed on
    /// profile updates).
    pub display_name: Option<String>,
}

/// Session keys for identity data.
pub mod session_keys {
    /// Key for storing the current visitor identity.
    pub const CURRENT_USER: &str = "current_user";
}
