//! Remote record shapes.
//!
//! These are the payloads exchanged with the remote cart and wishlist
//! services, kept separate from any wire framing. After any remote
//! mutation, the returned record is the single source of truth and replaces
//! the engine's in-memory list wholesale.

use serde::{Deserialize, Serialize};

use crate::types::item::{CartItem, WishlistItem};

/// The per-user cart record held by the remote cart service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    /// Canonical cart lines, one per product.
    pub items: Vec<CartItem>,
}

/// The per-user wishlist record held by the remote wishlist service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRecord {
    /// Canonical wishlist entries, one per product.
    pub items: Vec<WishlistItem>,
}

/// Result of syncing a guest cart snapshot into the remote cart record.
///
/// The remote resolves each submitted line against the live catalog. Lines
/// whose product still exists are folded into `cart`; lines that no longer
/// resolve are dropped, with their display names reported back in
/// `invalid_products` for user-facing disclosure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSyncOutcome {
    /// The canonical server cart after the merge.
    pub cart: CartRecord,
    /// Display names of submitted lines that resolved.
    pub valid_products: Vec<String>,
    /// Display names of submitted lines that were dropped.
    pub invalid_products: Vec<String>,
}
