//! Store Model

use crate::models::menu_item::MenuItem;
use crate::models::order::OrderType;
use crate::types::LocalizedText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Store entity as delivered by `GET /stores/{id}`
///
/// Every field is defaulted: the remote API omits sections a store has
/// not configured, and a missing section must read as "feature off"
/// rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    /// Currency code, lowercase on the wire (e.g. "usd", "eur")
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub banner_url: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub tables: Vec<TableRef>,
    /// Tag groups keyed by group name
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub tax_info: TaxInfo,
    #[serde(default)]
    pub settings: StoreSettings,
    #[serde(default)]
    pub services: StoreServices,
    #[serde(default)]
    pub store_info: StoreDetails,
    #[serde(default)]
    pub supported_order_types: Vec<OrderType>,
}

impl Store {
    /// Whether the store accepts the given fulfillment mode
    pub fn supports(&self, order_type: OrderType) -> bool {
        self.supported_order_types.contains(&order_type)
    }
}

/// Reference to a physical table published with the store record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(default)]
    pub number: i64,
    #[serde(default)]
    pub code: String,
}

/// Tax configuration for checkout math
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxInfo {
    /// Fractional rate (0.21 for 21%)
    #[serde(default)]
    pub tax_rate: f64,
    /// When true, tax is already part of the listed prices
    #[serde(default)]
    pub tax_included: bool,
}

/// Store behavior switches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Dine-in guests may order first and settle the bill later
    #[serde(default)]
    pub pay_later: bool,
}

/// Services the store has enabled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreServices {
    #[serde(default = "default_true")]
    pub pay_online: bool,
}

impl Default for StoreServices {
    fn default() -> Self {
        Self { pay_online: true }
    }
}

fn default_true() -> bool {
    true
}

/// Contact and opening-hours block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDetails {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    /// Opening hours keyed by weekday abbreviation ("Mon".."Sun"),
    /// value "HH:MM-HH:MM"
    #[serde(default)]
    pub hours: BTreeMap<String, String>,
}
