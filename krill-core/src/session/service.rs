//! SessionService - mutations over the per-store session state
//!
//! Explicitly constructed and passed by reference to callers; there is
//! no ambient global. Every mutation takes the target store id, locks
//! the state, applies the change, re-derives the cart totals when the
//! cart was touched, and persists the whole snapshot before returning.
//! The [`CurrentSession`] handle resolves the target to the currently
//! selected store for call-site parity with the view layer.

use super::persistence::{BackendError, SESSION_BLOB_KEY, SessionBackend};
use super::state::{LineKey, RECENT_STORES_CAP, SessionState, StoreSession};
use crate::pricing::line_total;
use parking_lot::RwLock;
use shared::models::cart::CartLine;
use shared::models::order::{OrderStatus, OrderType};
use shared::types::currency_symbol;
use std::sync::Arc;
use thiserror::Error;

/// Session service errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] BackendError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Single source of truth for all per-store ordering state
pub struct SessionService {
    state: RwLock<SessionState>,
    backend: Arc<dyn SessionBackend>,
}

impl SessionService {
    /// Construct the service, rehydrating the last persisted snapshot
    ///
    /// A missing blob starts a fresh session. A blob that no longer
    /// deserializes (schema change) is discarded and logged; there is
    /// no migration versioning.
    pub fn new(backend: Arc<dyn SessionBackend>) -> SessionResult<Self> {
        let state = match backend.load(SESSION_BLOB_KEY)? {
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable session blob");
                    SessionState::default()
                }
            },
            None => SessionState::default(),
        };

        Ok(Self {
            state: RwLock::new(state),
            backend,
        })
    }

    /// Fresh service over an in-memory backend (tab-scope analogue)
    pub fn in_memory(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            backend,
        }
    }

    fn persist(&self, state: &SessionState) -> SessionResult<()> {
        let bytes = serde_json::to_vec(state).map_err(BackendError::from)?;
        self.backend.save(SESSION_BLOB_KEY, &bytes)?;
        Ok(())
    }

    /// Apply a mutation under the write lock, then persist the snapshot
    ///
    /// Callers observe the mutation and its persistence as one step;
    /// the lock is held across both so no partial update is visible.
    fn mutate<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> SessionResult<R> {
        let mut state = self.state.write();
        let result = f(&mut state);
        self.persist(&state)?;
        Ok(result)
    }

    fn session_mut<'a>(state: &'a mut SessionState, store_id: &str) -> &'a mut StoreSession {
        state.stores.entry(store_id.to_string()).or_default()
    }

    fn recompute_totals(session: &mut StoreSession) {
        session.total_items = session.cart_items.iter().map(|l| l.quantity).sum();
        session.sub_total = session
            .cart_items
            .iter()
            .map(|l| line_total(l.price, l.quantity, &l.selected_customizations))
            .sum();
    }

    // ==================== Store selection ====================

    /// Make `store_id` the current store
    ///
    /// Lazily creates its session with defaults. Appends to the
    /// recents list only when absent (no reorder on re-select) and
    /// drops the oldest entries beyond the cap.
    pub fn select_store(&self, store_id: &str) -> SessionResult<()> {
        self.mutate(|state| {
            state.current_store = store_id.to_string();
            Self::session_mut(state, store_id);

            if !state.recent_stores.iter().any(|s| s == store_id) {
                state.recent_stores.push(store_id.to_string());
                let len = state.recent_stores.len();
                if len > RECENT_STORES_CAP {
                    state.recent_stores.drain(..len - RECENT_STORES_CAP);
                }
            }
        })
    }

    // ==================== Cart mutations ====================

    /// Add an item to a store's cart
    ///
    /// Merges into an existing line when the canonical key matches
    /// (quantity increments), otherwise appends. A zero quantity on
    /// the input counts as one. The caller's value is not modified.
    pub fn add_to_cart(&self, store_id: &str, item: &CartLine) -> SessionResult<()> {
        let quantity = item.quantity.max(1);
        let key = LineKey::of(item);

        self.mutate(|state| {
            let session = Self::session_mut(state, store_id);
            match session.cart_items.iter().position(|l| LineKey::of(l) == key) {
                Some(pos) => session.cart_items[pos].quantity += quantity,
                None => {
                    let mut line = item.clone();
                    line.quantity = quantity;
                    session.cart_items.push(line);
                }
            }
            Self::recompute_totals(session);
            tracing::debug!(
                store_id = %store_id,
                item_id = %item.id,
                total_items = session.total_items,
                "Added to cart"
            );
        })
    }

    /// Set a line's quantity to an absolute value
    ///
    /// Zero removes the line. A missing line with a positive quantity
    /// is inserted as a new line; a missing line with zero is a no-op.
    pub fn update_quantity(
        &self,
        store_id: &str,
        item: &CartLine,
        new_quantity: u32,
    ) -> SessionResult<()> {
        let key = LineKey::of(item);

        self.mutate(|state| {
            let session = Self::session_mut(state, store_id);
            if let Some(pos) = session
                .cart_items
                .iter()
                .position(|l| LineKey::of(l) == key)
            {
                if new_quantity == 0 {
                    session.cart_items.remove(pos);
                } else {
                    session.cart_items[pos].quantity = new_quantity;
                }
            } else if new_quantity > 0 {
                let mut line = item.clone();
                line.quantity = new_quantity;
                session.cart_items.push(line);
            }
            Self::recompute_totals(session);
        })
    }

    /// Empty a store's cart
    ///
    /// Totals go to zero; order type, table binding and order tracking
    /// survive.
    pub fn clear_cart(&self, store_id: &str) -> SessionResult<()> {
        self.mutate(|state| {
            let session = Self::session_mut(state, store_id);
            session.cart_items.clear();
            Self::recompute_totals(session);
            tracing::debug!(store_id = %store_id, "Cleared cart");
        })
    }

    // ==================== Field setters ====================

    pub fn set_order_type(&self, store_id: &str, order_type: OrderType) -> SessionResult<()> {
        self.mutate(|state| {
            Self::session_mut(state, store_id).order_type = order_type;
        })
    }

    /// Bind a physical table; number and code always travel together
    pub fn set_table(&self, store_id: &str, number: &str, code: &str) -> SessionResult<()> {
        self.mutate(|state| {
            let session = Self::session_mut(state, store_id);
            session.table_number = Some(number.to_string());
            session.table_code = Some(code.to_string());
        })
    }

    pub fn clear_table(&self, store_id: &str) -> SessionResult<()> {
        self.mutate(|state| {
            let session = Self::session_mut(state, store_id);
            session.table_number = None;
            session.table_code = None;
        })
    }

    pub fn set_order_status(
        &self,
        store_id: &str,
        status: Option<OrderStatus>,
    ) -> SessionResult<()> {
        self.mutate(|state| {
            Self::session_mut(state, store_id).order_status = status;
        })
    }

    pub fn set_order_id(&self, store_id: &str, order_id: Option<&str>) -> SessionResult<()> {
        self.mutate(|state| {
            Self::session_mut(state, store_id).order_id = order_id.map(str::to_string);
        })
    }

    pub fn set_order_number(&self, store_id: &str, number: Option<&str>) -> SessionResult<()> {
        self.mutate(|state| {
            Self::session_mut(state, store_id).order_number = number.map(str::to_string);
        })
    }

    /// Clear the active-order reference (status, id and number)
    pub fn reset_order(&self, store_id: &str) -> SessionResult<()> {
        self.mutate(|state| {
            let session = Self::session_mut(state, store_id);
            session.order_status = None;
            session.order_id = None;
            session.order_number = None;
        })
    }

    /// Derive and store the display symbol for a currency code
    pub fn set_currency(&self, store_id: &str, code: &str) -> SessionResult<()> {
        self.mutate(|state| {
            Self::session_mut(state, store_id).currency_symbol =
                currency_symbol(code).to_string();
        })
    }

    /// Session-wide search text (not store-scoped)
    pub fn set_search_query(&self, query: &str) -> SessionResult<()> {
        self.mutate(|state| {
            state.search_query = query.to_string();
        })
    }

    // ==================== Reads ====================

    /// Clone of the full snapshot
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Clone of one store's session, if it exists
    pub fn store_session(&self, store_id: &str) -> Option<StoreSession> {
        self.state.read().stores.get(store_id).cloned()
    }

    pub fn current_store(&self) -> String {
        self.state.read().current_store.clone()
    }

    /// Handle whose mutations target the currently selected store
    pub fn current(&self) -> CurrentSession<'_> {
        CurrentSession { service: self }
    }
}

/// Convenience wrapper resolving the mutation target to the current
/// store, mirroring the view layer's implicit-target call sites
pub struct CurrentSession<'a> {
    service: &'a SessionService,
}

impl CurrentSession<'_> {
    fn target(&self) -> String {
        self.service.current_store()
    }

    pub fn add_to_cart(&self, item: &CartLine) -> SessionResult<()> {
        self.service.add_to_cart(&self.target(), item)
    }

    pub fn update_quantity(&self, item: &CartLine, new_quantity: u32) -> SessionResult<()> {
        self.service.update_quantity(&self.target(), item, new_quantity)
    }

    pub fn clear_cart(&self) -> SessionResult<()> {
        self.service.clear_cart(&self.target())
    }

    pub fn set_order_type(&self, order_type: OrderType) -> SessionResult<()> {
        self.service.set_order_type(&self.target(), order_type)
    }

    pub fn set_currency(&self, code: &str) -> SessionResult<()> {
        self.service.set_currency(&self.target(), code)
    }

    /// Snapshot of the current store's session
    pub fn session(&self) -> Option<StoreSession> {
        self.service.store_session(&self.target())
    }
}
