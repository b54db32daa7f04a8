//! Core types for Cartwheel.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod item;
pub mod record;
pub mod totals;

pub use id::*;
pub use item::{CartItem, ItemError, ProductSummary, WishlistItem};
pub use record::{CartRecord, CartSyncOutcome, WishlistRecord};
pub use totals::CartTotals;
