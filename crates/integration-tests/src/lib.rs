//! Integration tests for ShopSync.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p shopsync-cli -- migrate
//! cargo run -p shopsync-cli -- seed
//!
//! # Start the web API
//! cargo run -p shopsync-web
//!
//! # Run integration tests
//! cargo test -p shopsync-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d by default because they need the running stack.

use reqwest::Client;

/// Base URL for the web API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("WEB_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A cookie-keeping client: the session cookie carries the visitor
/// identity between calls.
///
/// # Panics
///
/// Panics if the client cannot be built (test environment only).
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
