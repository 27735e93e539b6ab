//! HTTP route handlers for the web API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Identity
//! POST  /api/users             - Create visitor identity (pins session)
//! GET   /api/users/me          - Current identity
//! PATCH /api/users/me          - Update display name
//!
//! # Private rooms
//! POST /api/rooms              - Create room (generates join code)
//! POST /api/rooms/join         - Join room by code
//! GET  /api/rooms              - Caller's rooms with aggregates
//! GET  /api/rooms/{id}         - Room detail (members only)
//!
//! # Chat
//! GET  /api/rooms/{id}/messages        - Message history
//! POST /api/rooms/{id}/messages        - Post text or share a product
//! POST /api/messages/{id}/reactions    - Like/heart a message
//!
//! # Brand channels
//! GET  /api/channels                   - Directory (trending first, cached)
//! GET  /api/channels/{slug}            - Channel detail + product feed
//! POST /api/channels/{slug}/join       - Join channel
//! POST /api/channels/{slug}/products/{id}/reactions - React to a product
//!
//! # Products
//! GET  /api/products           - Catalog listing
//! GET  /api/products/{id}      - Product detail
//!
//! # Shared cart
//! GET    /api/carts                            - Cart for ?room_id= XOR ?channel_id=
//! POST   /api/carts/{id}/items                 - Add or increment a product
//! PATCH  /api/carts/{id}/items/{item_id}       - Apply quantity delta
//! DELETE /api/carts/{id}/items/{item_id}       - Remove line item
//! POST   /api/carts/{id}/items/{item_id}/votes     - Cast (or retract) a vote
//! POST   /api/carts/{id}/items/{item_id}/reactions - React to a line item
//! ```

pub mod cart;
pub mod channels;
pub mod chat;
pub mod products;
pub mod rooms;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the identity routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create))
        .route("/me", get(users::me).patch(users::update_display_name))
}

/// Create the room routes router (chat history lives under rooms).
pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(rooms::index).post(rooms::create))
        .route("/join", post(rooms::join))
        .route("/{id}", get(rooms::show))
        .route("/{id}/messages", get(chat::index).post(chat::create))
}

/// Create the channel routes router.
pub fn channel_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(channels::index))
        .route("/{slug}", get(channels::show))
        .route("/{slug}/join", post(channels::join))
        .route(
            "/{slug}/products/{product_id}/reactions",
            post(channels::react_to_product),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/{id}/items", post(cart::add_item))
        .route(
            "/{id}/items/{item_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/{id}/items/{item_id}/votes", post(cart::vote))
        .route("/{id}/items/{item_id}/reactions", post(cart::react))
}

/// Create all routes for the web API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/rooms", room_routes())
        .nest("/api/channels", channel_routes())
        .nest("/api/products", product_routes())
        .nest("/api/carts", cart_routes())
        .route("/api/messages/{id}/reactions", post(chat::react))
}
