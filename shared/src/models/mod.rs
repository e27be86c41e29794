//! Data models
//!
//! Shared between the session engine and the HTTP client. Everything
//! arriving from the remote API deserializes with defaults for absent
//! fields so a partial payload never propagates untyped data inward.

pub mod cart;
pub mod menu_item;
pub mod order;
pub mod reservation;
pub mod store;
pub mod table;

// Re-exports
pub use cart::*;
pub use menu_item::*;
pub use order::*;
pub use reservation::*;
pub use store::*;
pub use table::*;
