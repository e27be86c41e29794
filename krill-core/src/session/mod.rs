//! Per-store session state
//!
//! One [`state::StoreSession`] per store id, all held in a single
//! [`state::SessionState`] snapshot that the [`service::SessionService`]
//! mutates and persists as one blob.

pub mod persistence;
pub mod service;
pub mod state;
