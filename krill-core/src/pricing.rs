//! Line Price Calculator
//!
//! Computes the total of one cart line from its base price, quantity
//! and selected customization options.
//!
//! Uses rust_decimal for precision calculations. The calculator never
//! rounds; display code formats to 2 decimal places at the edge.

use rust_decimal::prelude::*;
use shared::models::cart::SelectedCustomization;

/// Rounding for display-formatted monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Total for one line: `(base + option surcharges) * quantity`
///
/// A missing option price counts as zero, as does an empty selection.
/// Pure and unrounded; callers format for display.
pub fn line_total(base_price: f64, quantity: u32, customizations: &[SelectedCustomization]) -> f64 {
    let mut unit = to_decimal(base_price);
    for group in customizations {
        for option in &group.selected_options {
            if let Some(price) = option.price {
                unit += to_decimal(price);
            }
        }
    }

    (unit * Decimal::from(quantity)).to_f64().unwrap_or_default()
}

/// Format a monetary amount with 2 decimal places for display and
/// order payloads
pub fn format_amount(value: f64) -> String {
    let rounded = to_decimal(value)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default();
    format!("{:.2}", rounded)
}
