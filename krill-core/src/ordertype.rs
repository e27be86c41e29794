//! Order-type resolution flow
//!
//! One shared transition function over the session's fulfillment mode:
//!
//! ```text
//! NotSelected --request--> InStore | Pickup | Delivery
//! ```
//!
//! Every entry point (initial popup, switcher control, URL query
//! parameters) routes through [`resolve_order_type`], so the guards
//! cannot drift apart:
//!
//! - the target mode must be declared in the store's
//!   `supported_order_types`;
//! - InStore additionally resolves the user-entered table code through
//!   the directory, binding the table on success and adopting an
//!   in-progress tab order when the table is occupied and the store
//!   allows paying later;
//! - Pickup and Delivery abandon any table binding and order
//!   reference.
//!
//! On any rejection no session state is mutated.

use crate::session::service::{SessionError, SessionService};
use crate::traits::{DirectoryError, StoreDirectory};
use shared::models::order::{OrderStatus, OrderType};
use shared::models::store::Store;
use shared::models::table::TableStatus;
use thiserror::Error;

/// A requested fulfillment-mode transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTypeRequest {
    Pickup,
    Delivery,
    InStore { table_code: String },
}

impl OrderTypeRequest {
    /// The mode this request transitions to
    pub fn target(&self) -> OrderType {
        match self {
            OrderTypeRequest::Pickup => OrderType::Pickup,
            OrderTypeRequest::Delivery => OrderType::Delivery,
            OrderTypeRequest::InStore { .. } => OrderType::InStore,
        }
    }

    /// Build a request from page-load query parameters
    ///
    /// Reads `order_type` and `table_code`. An in-store request
    /// without a table code is ignored, as is an unknown mode.
    pub fn from_query<'a, I>(params: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut order_type = None;
        let mut table_code = None;
        for (key, value) in params {
            match key {
                "order_type" => order_type = Some(value),
                "table_code" => table_code = Some(value),
                _ => {}
            }
        }

        match order_type? {
            "In-store" => table_code.map(|code| OrderTypeRequest::InStore {
                table_code: code.to_string(),
            }),
            "Pickup" => Some(OrderTypeRequest::Pickup),
            "Delivery" => Some(OrderTypeRequest::Delivery),
            _ => None,
        }
    }
}

/// Rejection reasons, each mapped to the message key the view shows
#[derive(Debug, Error)]
pub enum OrderTypeError {
    /// The store does not offer the requested mode. The flag marks
    /// the pickup-specific case of online payments being switched
    /// off, which gets its own message.
    #[error("Order type not available for this store")]
    NotSupported { online_payments_disabled: bool },

    /// The table code resolved to nothing
    #[error("Table not found")]
    TableNotFound,

    /// The table lookup itself failed
    #[error("Error fetching table: {0}")]
    Fetch(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl OrderTypeError {
    /// Translation key of the popup message for this rejection
    pub fn message_key(&self) -> &'static str {
        match self {
            OrderTypeError::NotSupported {
                online_payments_disabled: true,
            } => "store.notAvailableNoOnlinePayments",
            OrderTypeError::NotSupported { .. } => "store.notAvailable",
            OrderTypeError::TableNotFound => "store.tableNotFound",
            OrderTypeError::Fetch(_) | OrderTypeError::Session(_) => "store.errorFetchingTable",
        }
    }
}

/// Resolve a fulfillment-mode request against the session
///
/// Commits the transition on success; on any error the session is
/// left exactly as it was.
pub async fn resolve_order_type(
    service: &SessionService,
    store_id: &str,
    store: &Store,
    directory: &dyn StoreDirectory,
    request: &OrderTypeRequest,
) -> Result<(), OrderTypeError> {
    let target = request.target();
    if !store.supports(target) {
        // Only the pickup path distinguishes the disabled-payments
        // message; dine-in and delivery show the generic one.
        let online_payments_disabled =
            matches!(request, OrderTypeRequest::Pickup) && !store.services.pay_online;
        return Err(OrderTypeError::NotSupported {
            online_payments_disabled,
        });
    }

    match request {
        OrderTypeRequest::Pickup | OrderTypeRequest::Delivery => {
            service.set_order_type(store_id, target)?;
            service.clear_table(store_id)?;
            service.reset_order(store_id)?;
            tracing::debug!(store_id = %store_id, order_type = %target, "Order type selected");
            Ok(())
        }
        OrderTypeRequest::InStore { table_code } => {
            let table = match directory.table(store_id, table_code).await {
                Ok(table) => table,
                Err(DirectoryError::NotFound) => return Err(OrderTypeError::TableNotFound),
                Err(DirectoryError::Unavailable(e)) => return Err(OrderTypeError::Fetch(e)),
            };

            service.set_order_type(store_id, OrderType::InStore)?;
            service.set_table(store_id, &table.table_number, table_code)?;

            if table.status == TableStatus::Occupied && store.settings.pay_later {
                // Rejoin the tab order already open on this table
                service.set_order_status(store_id, Some(OrderStatus::Pending))?;
                service.set_order_id(store_id, table.order_id.as_deref())?;
                tracing::info!(
                    store_id = %store_id,
                    table = %table.table_number,
                    "Joined in-progress table order"
                );
            } else {
                service.reset_order(store_id)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::persistence::MemoryBackend;
    use async_trait::async_trait;
    use shared::models::store::{StoreServices, StoreSettings};
    use shared::models::table::Table;

    struct FixedDirectory {
        table: Result<Table, DirectoryError>,
    }

    #[async_trait]
    impl StoreDirectory for FixedDirectory {
        async fn store(&self, _store_id: &str) -> Result<Store, DirectoryError> {
            Err(DirectoryError::NotFound)
        }

        async fn table(&self, _store_id: &str, _code: &str) -> Result<Table, DirectoryError> {
            match &self.table {
                Ok(t) => Ok(t.clone()),
                Err(DirectoryError::NotFound) => Err(DirectoryError::NotFound),
                Err(DirectoryError::Unavailable(e)) => {
                    Err(DirectoryError::Unavailable(e.clone()))
                }
            }
        }
    }

    fn store_with(types: &[OrderType], pay_later: bool, pay_online: bool) -> Store {
        Store {
            id: "s1".to_string(),
            supported_order_types: types.to_vec(),
            settings: StoreSettings { pay_later },
            services: StoreServices { pay_online },
            ..Store::default()
        }
    }

    fn occupied_table(order_id: &str) -> Table {
        Table {
            table_number: "12".to_string(),
            status: TableStatus::Occupied,
            order_id: Some(order_id.to_string()),
        }
    }

    fn free_table() -> Table {
        Table {
            table_number: "3".to_string(),
            status: TableStatus::Available,
            order_id: None,
        }
    }

    fn service() -> SessionService {
        let svc = SessionService::in_memory(MemoryBackend::shared());
        svc.select_store("s1").unwrap();
        svc
    }

    fn all_types() -> Vec<OrderType> {
        vec![OrderType::InStore, OrderType::Pickup, OrderType::Delivery]
    }

    #[tokio::test]
    async fn test_pickup_rejected_when_unsupported() {
        let svc = service();
        let store = store_with(&[OrderType::InStore], false, true);
        let dir = FixedDirectory { table: Ok(free_table()) };

        let err = resolve_order_type(&svc, "s1", &store, &dir, &OrderTypeRequest::Pickup)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderTypeError::NotSupported { online_payments_disabled: false }
        ));
        assert_eq!(err.message_key(), "store.notAvailable");
        assert_eq!(
            svc.store_session("s1").unwrap().order_type,
            OrderType::NotSelected
        );
    }

    #[tokio::test]
    async fn test_pickup_rejection_names_disabled_payments() {
        let svc = service();
        let store = store_with(&[OrderType::InStore], false, false);
        let dir = FixedDirectory { table: Ok(free_table()) };

        let err = resolve_order_type(&svc, "s1", &store, &dir, &OrderTypeRequest::Pickup)
            .await
            .unwrap_err();
        assert_eq!(err.message_key(), "store.notAvailableNoOnlinePayments");

        // Delivery shows the generic message even with payments off
        let err = resolve_order_type(&svc, "s1", &store, &dir, &OrderTypeRequest::Delivery)
            .await
            .unwrap_err();
        assert_eq!(err.message_key(), "store.notAvailable");
    }

    #[tokio::test]
    async fn test_in_store_binds_table() {
        let svc = service();
        let store = store_with(&all_types(), false, true);
        let dir = FixedDirectory { table: Ok(free_table()) };

        resolve_order_type(
            &svc,
            "s1",
            &store,
            &dir,
            &OrderTypeRequest::InStore { table_code: "T3".to_string() },
        )
        .await
        .unwrap();

        let session = svc.store_session("s1").unwrap();
        assert_eq!(session.order_type, OrderType::InStore);
        assert_eq!(session.table_number.as_deref(), Some("3"));
        assert_eq!(session.table_code.as_deref(), Some("T3"));
        assert!(session.order_id.is_none());
        assert!(session.order_status.is_none());
    }

    #[tokio::test]
    async fn test_occupied_pay_later_adopts_order() {
        let svc = service();
        let store = store_with(&all_types(), true, true);
        let dir = FixedDirectory { table: Ok(occupied_table("ord-9")) };

        resolve_order_type(
            &svc,
            "s1",
            &store,
            &dir,
            &OrderTypeRequest::InStore { table_code: "T12".to_string() },
        )
        .await
        .unwrap();

        let session = svc.store_session("s1").unwrap();
        assert_eq!(session.order_status, Some(OrderStatus::Pending));
        assert_eq!(session.order_id.as_deref(), Some("ord-9"));
    }

    #[tokio::test]
    async fn test_occupied_without_pay_later_clears_order() {
        let svc = service();
        svc.set_order_id("s1", Some("stale")).unwrap();
        let store = store_with(&all_types(), false, true);
        let dir = FixedDirectory { table: Ok(occupied_table("ord-9")) };

        resolve_order_type(
            &svc,
            "s1",
            &store,
            &dir,
            &OrderTypeRequest::InStore { table_code: "T12".to_string() },
        )
        .await
        .unwrap();

        let session = svc.store_session("s1").unwrap();
        assert!(session.order_id.is_none());
        assert!(session.order_status.is_none());
    }

    #[tokio::test]
    async fn test_table_not_found_leaves_state_untouched() {
        let svc = service();
        let store = store_with(&all_types(), true, true);
        let dir = FixedDirectory { table: Err(DirectoryError::NotFound) };

        let err = resolve_order_type(
            &svc,
            "s1",
            &store,
            &dir,
            &OrderTypeRequest::InStore { table_code: "bad".to_string() },
        )
        .await
        .unwrap_err();

        assert_eq!(err.message_key(), "store.tableNotFound");
        let session = svc.store_session("s1").unwrap();
        assert_eq!(session.order_type, OrderType::NotSelected);
        assert!(!session.has_table());
    }

    #[tokio::test]
    async fn test_lookup_failure_leaves_state_untouched() {
        let svc = service();
        let store = store_with(&all_types(), true, true);
        let dir = FixedDirectory {
            table: Err(DirectoryError::Unavailable("timeout".to_string())),
        };

        let err = resolve_order_type(
            &svc,
            "s1",
            &store,
            &dir,
            &OrderTypeRequest::InStore { table_code: "T1".to_string() },
        )
        .await
        .unwrap_err();

        assert_eq!(err.message_key(), "store.errorFetchingTable");
        assert!(!svc.store_session("s1").unwrap().has_table());
    }

    #[tokio::test]
    async fn test_switching_to_pickup_abandons_table_and_order() {
        let svc = service();
        let store = store_with(&all_types(), true, true);
        let dir = FixedDirectory { table: Ok(occupied_table("ord-9")) };

        resolve_order_type(
            &svc,
            "s1",
            &store,
            &dir,
            &OrderTypeRequest::InStore { table_code: "T12".to_string() },
        )
        .await
        .unwrap();

        resolve_order_type(&svc, "s1", &store, &dir, &OrderTypeRequest::Pickup)
            .await
            .unwrap();

        let session = svc.store_session("s1").unwrap();
        assert_eq!(session.order_type, OrderType::Pickup);
        assert!(session.table_number.is_none());
        assert!(session.table_code.is_none());
        assert!(session.order_status.is_none());
        assert!(session.order_id.is_none());
        assert!(session.order_number.is_none());
    }

    #[test]
    fn test_from_query() {
        let req = OrderTypeRequest::from_query([("order_type", "In-store"), ("table_code", "T7")]);
        assert_eq!(
            req,
            Some(OrderTypeRequest::InStore { table_code: "T7".to_string() })
        );

        // In-store without a code is ignored
        assert_eq!(
            OrderTypeRequest::from_query([("order_type", "In-store")]),
            None
        );
        assert_eq!(
            OrderTypeRequest::from_query([("order_type", "Pickup"), ("utm", "x")]),
            Some(OrderTypeRequest::Pickup)
        );
        assert_eq!(
            OrderTypeRequest::from_query([("order_type", "Delivery")]),
            Some(OrderTypeRequest::Delivery)
        );
        assert_eq!(OrderTypeRequest::from_query([("order_type", "Teleport")]), None);
        assert_eq!(OrderTypeRequest::from_query([("table_code", "T7")]), None);
    }
}
