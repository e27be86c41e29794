//! Krill Core - session engine for the customer ordering client
//!
//! Single source of truth for per-store ordering state: the cart with
//! derived totals, the fulfillment mode with its table binding, and
//! the reference to an order already placed upstream. Mutations are
//! synchronous, atomic to callers, and persist the session snapshot
//! through a pluggable backend after every change.
//!
//! The async seams (store/table lookup, order placement, reservation
//! submission, bot verification) are traits in [`traits`], implemented
//! by the HTTP client crate and mocked in tests.

pub mod checkout;
pub mod flow;
pub mod lang;
pub mod ordertype;
pub mod pricing;
pub mod reservation;
pub mod session;
pub mod traits;

pub use flow::{ActionFlow, FlowError, FlowState};
pub use ordertype::{OrderTypeError, OrderTypeRequest, resolve_order_type};
pub use pricing::{format_amount, line_total};
pub use session::persistence::{BackendError, MemoryBackend, RedbBackend, SessionBackend};
pub use session::service::{SessionError, SessionResult, SessionService};
pub use session::state::{LineKey, SessionState, StoreSession};
pub use traits::{DirectoryError, GatewayError, StoreDirectory, VerifierError};
