//! Scripted guest -> sign-in merge walkthrough.
//!
//! Seeds an in-memory backend, builds a guest cart and wishlist, deletes one
//! product from the catalog, then signs in and reports what the merge
//! protocol kept, dropped, and disclosed.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use cartwheel_core::{CartItem, ProductSummary, UserId, WishlistItem};
use cartwheel_sync::remote::MemoryBackend;
use cartwheel_sync::snapshot::MemorySnapshotStore;
use cartwheel_sync::{CartEngine, WishlistEngine};

/// Run the demo scenario end to end.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let backend = MemoryBackend::new();
    let mug = ProductSummary::new("aurora-mug", "Aurora Mug", Decimal::new(1450, 2), None)?;
    let tee = ProductSummary::new("solstice-tee", "Solstice Tee", Decimal::new(2400, 2), None)?;
    backend.seed_product(mug.clone());
    backend.seed_product(tee.clone());

    let cart = CartEngine::new(
        backend.clone(),
        Arc::new(MemorySnapshotStore::<CartItem>::new()),
    );
    let wishlist = WishlistEngine::new(
        backend.clone(),
        cart.clone(),
        Arc::new(MemorySnapshotStore::<WishlistItem>::new()),
    );

    // Shop as a guest: everything lands in the local snapshots
    cart.add_item(&mug, 2).await?;
    cart.add_item(&tee, 1).await?;
    wishlist.add_item(&mug).await?;
    let totals = cart.totals();
    info!(
        total_quantity = totals.total_quantity,
        total_price = %totals.total_price,
        "guest cart built"
    );

    // The tee disappears from the catalog before the user signs in
    backend.remove_product(&tee.product_id);
    info!(product = %tee.name, "product removed from catalog");

    // Sign in: the guest snapshots merge into the account records
    let user = UserId::new("demo-user");
    let outcome = cart.handle_sign_in(user.clone()).await?;
    if outcome.is_clean() {
        info!("cart merge completed with no dropped lines");
    } else {
        warn!(dropped = ?outcome.dropped_products, "cart merge dropped unavailable products");
    }
    wishlist.handle_sign_in(user).await?;

    let totals = cart.totals();
    info!(
        total_quantity = totals.total_quantity,
        total_price = %totals.total_price,
        "account cart after merge"
    );

    // Move the wishlisted mug into the cart, now in authenticated mode
    wishlist.move_item_to_cart(&mug.product_id, 1).await?;
    let totals = cart.totals();
    info!(
        total_quantity = totals.total_quantity,
        total_price = %totals.total_price,
        wishlist_entries = wishlist.items().len(),
        "after move to cart"
    );

    Ok(())
}
