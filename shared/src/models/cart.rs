//! Cart Line Model
//!
//! A cart line is one distinct (item, customization selection) entry
//! with a quantity. Two lines are the same line iff the item id and
//! the full customization selection match; the canonical key for that
//! comparison lives in the session engine.

use crate::types::LocalizedText;
use serde::{Deserialize, Serialize};

/// One line of a cart, as stored in the session blob and submitted in
/// order payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub name: LocalizedText,
    /// Base unit price, before customizations
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_customizations: Vec<SelectedCustomization>,
}

impl CartLine {
    pub fn new(id: impl Into<String>, name: LocalizedText, price: f64) -> Self {
        Self {
            id: id.into(),
            name,
            price,
            quantity: 1,
            selected_customizations: Vec::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_customizations(mut self, customizations: Vec<SelectedCustomization>) -> Self {
        self.selected_customizations = customizations;
        self
    }
}

/// Options chosen within one customization group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCustomization {
    /// Index of the group in the menu item's customization list
    pub index: u32,
    pub name: LocalizedText,
    pub selected_options: Vec<SelectedOption>,
}

/// One chosen option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Index of the option within its group
    pub index: u32,
    pub name: LocalizedText,
    /// Price surcharge; absent counts as zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}
