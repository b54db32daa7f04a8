//! Normalized cart and wishlist item records.
//!
//! All items enter the engines through [`ProductSummary`], the single
//! mapping step at the system boundary. Inside the engines there is exactly
//! one shape per collection: [`CartItem`] (carries a quantity) and
//! [`WishlistItem`] (carries an insertion timestamp instead).
//!
//! `name`, `price`, and `image` are a denormalized display snapshot taken at
//! insertion time; they may go stale relative to the live catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// Errors that can occur when normalizing an item at the boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// The product identifier is empty.
    #[error("product id cannot be empty")]
    EmptyProductId,
    /// The price is negative.
    #[error("price cannot be negative: {0}")]
    NegativePrice(Decimal),
}

/// A normalized product snapshot, ready to be inserted into a cart or
/// wishlist.
///
/// Upstream catalog payloads come in several shapes (`id` vs `_id`, optional
/// display fields); this type is the one place that ambiguity is resolved.
/// A `ProductSummary` always has a non-empty [`ProductId`] and a
/// non-negative price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// Stable catalog identifier.
    pub product_id: ProductId,
    /// Display name at the time of capture.
    pub name: String,
    /// Unit price at the time of capture.
    pub price: Decimal,
    /// Display image URL, if the catalog provided one.
    pub image: Option<String>,
}

impl ProductSummary {
    /// Create a normalized product snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::EmptyProductId`] if the identifier is empty and
    /// [`ItemError::NegativePrice`] if the price is below zero.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
        image: Option<String>,
    ) -> Result<Self, ItemError> {
        let product_id = product_id.into();
        if product_id.is_empty() {
            return Err(ItemError::EmptyProductId);
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(ItemError::NegativePrice(price));
        }

        Ok(Self {
            product_id,
            name: name.into(),
            price,
            image,
        })
    }
}

/// A single cart line.
///
/// At most one line exists per product; repeated adds fold into the
/// existing line by incrementing `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Stable catalog identifier. Immutable once set.
    pub product_id: ProductId,
    /// Display name snapshot.
    pub name: String,
    /// Unit price snapshot.
    pub price: Decimal,
    /// Display image snapshot.
    pub image: Option<String>,
    /// Number of units. Always at least 1; a request for 0 is a removal.
    pub quantity: u32,
}

impl CartItem {
    /// Create a cart line from a normalized product snapshot.
    #[must_use]
    pub fn new(product: &ProductSummary, quantity: u32) -> Self {
        Self {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }

    /// Price of this line (`price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// The display snapshot of this line, for re-insertion elsewhere
    /// (e.g. moving a wishlist line into the cart).
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}

/// A single wishlist entry.
///
/// Wishlist entries have no quantity and are never edited, only added and
/// removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    /// Stable catalog identifier. Immutable once set.
    pub product_id: ProductId,
    /// Display name snapshot.
    pub name: String,
    /// Unit price snapshot.
    pub price: Decimal,
    /// Display image snapshot.
    pub image: Option<String>,
    /// When the entry was added. Set once at insertion, never mutated.
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Create a wishlist entry from a normalized product snapshot.
    #[must_use]
    pub fn new(product: &ProductSummary, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            added_at,
        }
    }

    /// The display snapshot of this entry, for handing off into the cart.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_summary_rejects_empty_product_id() {
        let result = ProductSummary::new("", "Widget", price(999), None);
        assert_eq!(result.unwrap_err(), ItemError::EmptyProductId);
    }

    #[test]
    fn test_summary_rejects_negative_price() {
        let result = ProductSummary::new("prod-1", "Widget", price(-1), None);
        assert!(matches!(result.unwrap_err(), ItemError::NegativePrice(_)));
    }

    #[test]
    fn test_summary_accepts_zero_price() {
        // Free items are legal; only negative prices are malformed
        assert!(ProductSummary::new("prod-1", "Sample", Decimal::ZERO, None).is_ok());
    }

    #[test]
    fn test_cart_line_total() {
        let product = ProductSummary::new("prod-1", "Widget", price(1050), None).unwrap();
        let item = CartItem::new(&product, 3);
        assert_eq!(item.line_total(), price(3150));
    }

    #[test]
    fn test_wishlist_item_keeps_added_at() {
        let product = ProductSummary::new("prod-1", "Widget", price(500), None).unwrap();
        let at = Utc::now();
        let item = WishlistItem::new(&product, at);
        assert_eq!(item.added_at, at);
        assert_eq!(item.summary(), product);
    }
}
