//! Table Model

use serde::{Deserialize, Serialize};

/// Table record returned by `GET /tables/{storeId}/{tableCode}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub table_number: String,
    #[serde(default)]
    pub status: TableStatus,
    /// Order currently open on this table, when occupied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Occupancy state of a physical table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    /// Any status string this client does not know
    #[serde(other)]
    Unknown,
}
