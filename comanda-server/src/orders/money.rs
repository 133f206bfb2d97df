//! Precise money arithmetic behind f64 wire values
//!
//! Wire types carry f64 for client convenience; all arithmetic goes through
//! `rust_decimal` and results are rounded to cents.

use rust_decimal::prelude::*;
use shared::order::ModifierSelection;

/// Convert an f64 amount to Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert a Decimal back to f64, rounded to cents
pub fn to_f64(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or(0.0)
}

/// Item subtotal: (unit_price + Σ modifier deltas) × quantity
///
/// Computed once at placement; catalog price changes never retroactively
/// affect placed orders.
pub fn item_subtotal(unit_price: f64, modifiers: &[ModifierSelection], quantity: i32) -> f64 {
    let unit = to_decimal(unit_price)
        + modifiers
            .iter()
            .map(|m| to_decimal(m.price_delta))
            .sum::<Decimal>();
    to_f64(unit * Decimal::from(quantity))
}

/// Order total: sum of item subtotals
pub fn order_total<I: IntoIterator<Item = f64>>(subtotals: I) -> f64 {
    to_f64(subtotals.into_iter().map(to_decimal).sum())
}
