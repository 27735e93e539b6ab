//! Domain models for the web API.
//!
//! Validated domain objects separate from database row types. The cart
//! model itself lives in `shopsync-core`; everything here is the
//! surrounding application - users, rooms, channels, chat.

pub mod channel;
pub mod message;
pub mod product;
pub mod room;
pub mod session;
pub mod user;

pub use channel::{Channel, ChannelProduct, ChannelSummary};
pub use message::{Message, MessageKind};
pub use product::Product;
pub use room::{Room, RoomSummary};
pub use session::{CurrentUser, session_keys};
pub use user::User;
