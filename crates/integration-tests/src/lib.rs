//! Integration tests for Cartwheel.
//!
//! The tests drive both synchronization engines against the in-memory
//! reference backend, so the full guest/authenticated behavior can be
//! verified without a real cart service.
//!
//! # Test Categories
//!
//! - `cart_guest` - Guest-mode cart behavior and snapshot persistence
//! - `cart_merge` - The sign-in merge protocol
//! - `wishlist` - Wishlist behavior and the move-to-cart handoff
//! - `session_driver` - Session-signal-driven mode transitions

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use cartwheel_core::{CartItem, ProductSummary, WishlistItem};
use cartwheel_sync::remote::MemoryBackend;
use cartwheel_sync::snapshot::MemorySnapshotStore;
use cartwheel_sync::{CartEngine, WishlistEngine};

/// Everything a test needs to drive both engines against the in-memory
/// backend.
pub struct TestContext {
    pub backend: MemoryBackend,
    pub cart_snapshot: Arc<MemorySnapshotStore<CartItem>>,
    pub wishlist_snapshot: Arc<MemorySnapshotStore<WishlistItem>>,
    pub cart: CartEngine<MemoryBackend>,
    pub wishlist: WishlistEngine<MemoryBackend, MemoryBackend>,
}

impl TestContext {
    /// Build engines over fresh in-memory snapshots and an empty backend.
    #[must_use]
    pub fn new() -> Self {
        let backend = MemoryBackend::new();
        let cart_snapshot = Arc::new(MemorySnapshotStore::<CartItem>::new());
        let wishlist_snapshot = Arc::new(MemorySnapshotStore::<WishlistItem>::new());
        let cart = CartEngine::new(backend.clone(), cart_snapshot.clone());
        let wishlist = WishlistEngine::new(backend.clone(), cart.clone(), wishlist_snapshot.clone());

        Self {
            backend,
            cart_snapshot,
            wishlist_snapshot,
            cart,
            wishlist,
        }
    }

    /// Seed a product into the backend catalog and return its summary.
    pub fn seed(&self, id: &str, price_cents: i64) -> ProductSummary {
        let product = product(id, price_cents);
        self.backend.seed_product(product.clone());
        product
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A normalized product summary for tests. The display name is derived from
/// the ID so merge disclosures are easy to assert on.
#[must_use]
pub fn product(id: &str, price_cents: i64) -> ProductSummary {
    ProductSummary::new(id, format!("Product {id}"), Decimal::new(price_cents, 2), None)
        .expect("valid test product")
}

/// Await a condition, polling briefly between checks.
///
/// # Panics
///
/// Panics if the condition does not hold within the timeout.
pub async fn wait_for(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for: {what}");
}
