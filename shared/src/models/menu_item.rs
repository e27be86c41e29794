//! Menu Item Model

use crate::types::LocalizedText;
use serde::{Deserialize, Serialize};

/// One entry of a store menu
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category: LocalizedText,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    /// Base unit price, before customizations
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
    /// 0 = unfeatured, otherwise position within the featured block
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub customizations: Vec<CustomizationGroup>,
}

/// A customization category offered for a menu item (e.g. "Size")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomizationGroup {
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub options: Vec<CustomizationOption>,
    /// Maximum number of options selectable in this group
    #[serde(default, rename = "maxSelect")]
    pub max_select: u32,
}

/// One selectable option within a customization group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomizationOption {
    #[serde(default)]
    pub name: LocalizedText,
    /// Price surcharge; absent means free
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_with_customizations() {
        let item: MenuItem = serde_json::from_str(
            r#"{
                "id": "noodles",
                "name": {"en": "Noodles"},
                "price": 8.5,
                "customizations": [{
                    "name": {"en": "Size"},
                    "options": [{"name": {"en": "Large"}, "price": 2.0}, {"name": {"en": "Small"}}],
                    "maxSelect": 1
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(item.customizations.len(), 1);
        let group = &item.customizations[0];
        assert_eq!(group.max_select, 1);
        assert_eq!(group.options[0].price, Some(2.0));
        assert_eq!(group.options[1].price, None);
    }
}
