//! Order Model

use crate::models::cart::SelectedCustomization;
use crate::types::LocalizedText;
use serde::{Deserialize, Serialize};

/// Fulfillment mode of a session
///
/// Wire strings match the remote API exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    #[serde(rename = "Not Selected")]
    NotSelected,
    #[serde(rename = "In-store")]
    InStore,
    Pickup,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::NotSelected => "Not Selected",
            OrderType::InStore => "In-store",
            OrderType::Pickup => "Pickup",
            OrderType::Delivery => "Delivery",
        }
    }

    /// Parse the wire string, `None` for anything unknown
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Not Selected" => Some(OrderType::NotSelected),
            "In-store" => Some(OrderType::InStore),
            "Pickup" => Some(OrderType::Pickup),
            "Delivery" => Some(OrderType::Delivery),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side lifecycle state of a placed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Completed,
    /// Any status string this client does not know
    #[serde(untagged)]
    Other(String),
}

/// Order record returned by `GET /orders_new/{storeId}/{orderId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub order_items: Vec<OrderLine>,
    #[serde(default)]
    pub order_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub invoice_url: String,
    /// Online payment service fee, present once paid online
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_fee_surcharge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation_surcharge: Option<f64>,
}

/// One line of a placed order
///
/// `price` is the unit price including selected customizations, as
/// computed by the client at submission time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_customizations: Vec<SelectedCustomization>,
}
