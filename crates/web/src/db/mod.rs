//! Database operations for the ShopSync `PostgreSQL` store.
//!
//! # Database: `shopsync`
//!
//! ## Tables
//!
//! - `users` - Anonymous visitor identities (display name + avatar)
//! - `sessions` - Tower-sessions storage
//! - `rooms` / `room_members` - Private shopping rooms and membership
//! - `channels` / `channel_members` - Public brand channels
//! - `products` - Product catalog (prices in integer minor units)
//! - `carts` / `cart_items` / `cart_item_votes` - Shared-cart snapshots
//! - `messages` - Room chat (text / product / system)
//! - `product_reactions` - Per-channel product reaction counters
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p shopsync-cli -- migrate
//! ```
//!
//! # Error model
//!
//! Every repository returns [`RepositoryError`] - a small closed set of
//! error kinds translated from sqlx at this boundary, so the rest of the
//! application never sees raw driver errors.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod carts;
pub mod channels;
pub mod messages;
pub mod products;
pub mod rooms;
pub mod users;

pub use carts::CartRepository;
pub use channels::ChannelRepository;
pub use messages::MessageRepository;
pub use products::ProductRepository;
pub use rooms::RoomRepository;
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate room code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
