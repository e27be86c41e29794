//! Response envelopes for the remote ordering API

use crate::models::store::Store;
use serde::{Deserialize, Serialize};

/// Envelope of `GET /stores/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreListResponse {
    #[serde(default)]
    pub stores: Vec<Store>,
}

/// Envelope of `POST /orders_new/`
///
/// Exactly one of `order` and `error` is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<PlacedOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Identifiers of a freshly placed order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacedOrder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub order_number: String,
}

/// Error body some endpoints attach to non-2xx responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_order_success() {
        let resp: PlaceOrderResponse =
            serde_json::from_str(r#"{"order": {"id": "o1", "order_number": "17"}}"#).unwrap();
        let order = resp.order.unwrap();
        assert_eq!(order.id, "o1");
        assert_eq!(order.order_number, "17");
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_place_order_rejection() {
        let resp: PlaceOrderResponse =
            serde_json::from_str(r#"{"error": "Store is closed"}"#).unwrap();
        assert!(resp.order.is_none());
        assert_eq!(resp.error.as_deref(), Some("Store is closed"));
    }
}
