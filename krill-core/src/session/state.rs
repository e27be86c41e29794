//! Session state types and the canonical cart line key

use serde::{Deserialize, Serialize};
use shared::models::cart::CartLine;
use shared::models::order::{OrderStatus, OrderType};
use std::collections::BTreeMap;

/// How many stores the recents list keeps (oldest dropped first)
pub const RECENT_STORES_CAP: usize = 10;

/// Canonical identity of a cart line
///
/// Two additions merge into one line iff the item id and the exact
/// customization selection match. Group entries are sorted by group
/// index and option indices within each group, so the key does not
/// depend on the order the UI emitted the selection in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    id: String,
    selection: Vec<(u32, Vec<u32>)>,
}

impl LineKey {
    pub fn of(line: &CartLine) -> Self {
        let mut selection: Vec<(u32, Vec<u32>)> = line
            .selected_customizations
            .iter()
            .map(|group| {
                let mut options: Vec<u32> =
                    group.selected_options.iter().map(|o| o.index).collect();
                options.sort_unstable();
                (group.index, options)
            })
            .collect();
        selection.sort_unstable();

        Self {
            id: line.id.clone(),
            selection,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.id
    }
}

/// Per-store slice of the session
///
/// `total_items` and `sub_total` are derived from `cart_items` and
/// recomputed by the service on every cart mutation; nothing else
/// writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSession {
    pub cart_items: Vec<CartLine>,
    pub total_items: u32,
    pub sub_total: f64,
    pub order_type: OrderType,
    /// Physical table binding; number and code are always set or
    /// cleared together
    pub table_number: Option<String>,
    pub table_code: Option<String>,
    pub order_status: Option<OrderStatus>,
    pub order_id: Option<String>,
    pub order_number: Option<String>,
    pub currency_symbol: String,
}

impl Default for StoreSession {
    fn default() -> Self {
        Self {
            cart_items: Vec::new(),
            total_items: 0,
            sub_total: 0.0,
            order_type: OrderType::NotSelected,
            table_number: None,
            table_code: None,
            order_status: None,
            order_id: None,
            order_number: None,
            currency_symbol: "$".to_string(),
        }
    }
}

impl StoreSession {
    /// Whether a table is currently bound to this session
    pub fn has_table(&self) -> bool {
        self.table_number.is_some()
    }
}

/// The whole session snapshot, serialized as one blob
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub current_store: String,
    /// Most-recent-last, capped, no duplicates; re-selecting a listed
    /// store does not reorder it
    pub recent_stores: Vec<String>,
    pub stores: BTreeMap<String, StoreSession>,
    /// Session-wide, not store-scoped
    pub search_query: String,
}

impl SessionState {
    /// The current store's session, if one was ever selected
    pub fn current(&self) -> Option<&StoreSession> {
        self.stores.get(&self.current_store)
    }
}
