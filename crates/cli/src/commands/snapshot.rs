//! Local guest snapshot inspection.

use tracing::info;

use cartwheel_core::{CartItem, CartTotals, WishlistItem};
use cartwheel_sync::config::snapshot_dir_from_env;
use cartwheel_sync::snapshot::{FileSnapshotStore, SnapshotStore, files};

/// Print the stored cart and wishlist snapshots.
pub fn show() {
    let dir = snapshot_dir_from_env();

    let cart_store = FileSnapshotStore::<CartItem>::new(dir.join(files::CART));
    let cart = cart_store.load();
    for line in &cart {
        info!(
            product_id = %line.product_id,
            name = %line.name,
            quantity = line.quantity,
            price = %line.price,
            "cart line"
        );
    }
    let totals = CartTotals::of(&cart);
    info!(
        lines = cart.len(),
        total_quantity = totals.total_quantity,
        total_price = %totals.total_price,
        "cart snapshot"
    );

    let wishlist_store = FileSnapshotStore::<WishlistItem>::new(dir.join(files::WISHLIST));
    let wishlist = wishlist_store.load();
    for entry in &wishlist {
        info!(
            product_id = %entry.product_id,
            name = %entry.name,
            added_at = %entry.added_at,
            "wishlist entry"
        );
    }
    info!(entries = wishlist.len(), "wishlist snapshot");
}

/// Remove both snapshots.
pub fn clear() {
    let dir = snapshot_dir_from_env();
    FileSnapshotStore::<CartItem>::new(dir.join(files::CART)).clear();
    FileSnapshotStore::<WishlistItem>::new(dir.join(files::WISHLIST)).clear();
    info!(dir = %dir.display(), "snapshots cleared");
}
