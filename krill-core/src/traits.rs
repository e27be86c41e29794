//! Collaborator seams for async I/O
//!
//! The session engine never talks to the network itself. Store and
//! table lookup, order placement, reservation submission and bot
//! verification are traits implemented by the HTTP client crate and
//! mocked in tests. Errors are terminal: no collaborator retries.

use async_trait::async_trait;
use shared::models::reservation::ReservationRequest;
use shared::models::store::Store;
use shared::models::table::Table;
use shared::response::PlacedOrder;
use thiserror::Error;

/// Lookup failures from the store/table directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The record does not exist upstream
    #[error("Not found")]
    NotFound,

    /// Transport or server failure; the record may or may not exist
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the remote store directory
#[async_trait]
pub trait StoreDirectory: Send + Sync {
    /// Fetch one store with its menu, settings and services
    async fn store(&self, store_id: &str) -> Result<Store, DirectoryError>;

    /// Resolve a user-entered table code to a table record
    async fn table(&self, store_id: &str, table_code: &str) -> Result<Table, DirectoryError>;
}

/// Failures from the order/reservation gateways
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server processed the request and said no
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Transport or server failure before an answer
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

/// Order placement against the remote API
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// `POST /orders_new/` with the order payload and a bot
    /// verification token
    async fn place_order(
        &self,
        draft: &crate::checkout::OrderDraft,
        verification_token: &str,
    ) -> Result<PlacedOrder, GatewayError>;
}

/// Reservation creation against the remote API
#[async_trait]
pub trait ReservationGateway: Send + Sync {
    /// `POST /email/send_verification_code`
    async fn send_verification_code(
        &self,
        email: &str,
        verification_token: &str,
    ) -> Result<(), GatewayError>;

    /// `POST /reservation/`
    async fn create_reservation(&self, request: &ReservationRequest) -> Result<(), GatewayError>;
}

/// Bot-verification token failures
#[derive(Debug, Error)]
pub enum VerifierError {
    /// Provider not loaded or unreachable; the action aborts
    #[error("Verification unavailable: {0}")]
    Unavailable(String),
}

/// Bot-verification provider (external, treated as a black box)
#[async_trait]
pub trait BotVerifier: Send + Sync {
    /// Obtain a short-lived token for the named action
    async fn token(&self, action: &str) -> Result<String, VerifierError>;
}
