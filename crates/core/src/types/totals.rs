//! Derived cart totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::item::CartItem;

/// Aggregated view over a cart's lines.
///
/// Pure derivation: recomputed on every read, reflects exactly the slice it
/// was computed from, never triggers I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of all line quantities.
    pub total_quantity: u32,
    /// Sum of `price × quantity` over all lines.
    pub total_price: Decimal,
}

impl CartTotals {
    /// Compute totals over the given cart lines.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            total_quantity: items.iter().map(|item| item.quantity).sum(),
            total_price: items.iter().map(CartItem::line_total).sum(),
        }
    }
}
