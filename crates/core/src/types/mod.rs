//! Core types for ShopSync.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod room_code;

pub use id::*;
pub use price::{CurrencyCode, Price};
pub use room_code::{ROOM_CODE_LENGTH, RoomCode, RoomCodeError};
