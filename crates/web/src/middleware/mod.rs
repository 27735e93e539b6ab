//! Middleware for the web API.

pub mod identity;
pub mod session;

pub use identity::{OptionalUser, RequireUser};
pub use session::create_session_layer;
