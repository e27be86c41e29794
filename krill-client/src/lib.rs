//! Krill Client - HTTP client for the remote ordering API
//!
//! Typed JSON calls over reqwest, with tab-scoped caching of store
//! records and builders for the redirect-based payment submits. The
//! client implements the core engine's directory and gateway traits,
//! so flows never see HTTP types.

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::StoreCache;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, PaymentForm};
