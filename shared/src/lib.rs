//! Shared types for the Krill ordering client
//!
//! Wire-level models consumed from the remote ordering API, plus the
//! cart/session value types shared between the core engine and the
//! HTTP client. All boundary types deserialize defensively: unknown
//! or missing fields collapse to defaults instead of failing.

pub mod models;
pub mod response;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    CartLine, CustomizationGroup, CustomizationOption, MenuItem, Order, OrderLine, OrderStatus,
    OrderType, ReservationRequest, SelectedCustomization, SelectedOption, Store, StoreDetails,
    StoreServices, StoreSettings, Table, TableRef, TableStatus, TaxInfo,
};
pub use response::{PlaceOrderResponse, PlacedOrder, StoreListResponse};
pub use types::{Language, LocalizedText, currency_symbol};
