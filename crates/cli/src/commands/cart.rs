//! Guest-mode cart operations against the local snapshot.
//!
//! These commands construct a guest-mode engine over the file snapshot, so
//! they behave exactly like the embedding app would before sign-in. Guest
//! operations never touch the remote backend.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use cartwheel_core::{CartItem, ProductId, ProductSummary};
use cartwheel_sync::CartEngine;
use cartwheel_sync::config::snapshot_dir_from_env;
use cartwheel_sync::remote::MemoryBackend;
use cartwheel_sync::snapshot::{FileSnapshotStore, files};

fn engine() -> CartEngine<MemoryBackend> {
    let path = snapshot_dir_from_env().join(files::CART);
    // Guest mode never dispatches to the remote; the in-memory backend is a
    // placeholder satisfying the engine's seam.
    CartEngine::new(
        MemoryBackend::new(),
        Arc::new(FileSnapshotStore::<CartItem>::new(path)),
    )
}

fn report(engine: &CartEngine<MemoryBackend>, message: &str) {
    let totals = engine.totals();
    info!(
        lines = engine.items().len(),
        total_quantity = totals.total_quantity,
        total_price = %totals.total_price,
        "{message}"
    );
}

/// Add a product to the guest cart.
pub async fn add(
    product_id: &str,
    name: &str,
    price: Decimal,
    quantity: u32,
    image: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let product = ProductSummary::new(product_id, name, price, image)?;
    let engine = engine();
    engine.add_item(&product, quantity).await?;
    report(&engine, "item added");
    Ok(())
}

/// Set the quantity of an existing line (0 removes it).
pub async fn update(product_id: &str, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    engine
        .update_item(&ProductId::new(product_id), quantity)
        .await?;
    report(&engine, "item updated");
    Ok(())
}

/// Remove a line.
pub async fn remove(product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let removed = engine.remove_item(&ProductId::new(product_id)).await?;
    if removed {
        report(&engine, "item removed");
    } else {
        info!(product_id, "no such line in the cart");
    }
    Ok(())
}

/// Empty the guest cart.
pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    engine.clear().await?;
    info!("cart cleared");
    Ok(())
}

/// Print the guest cart and its totals.
pub fn show() {
    let engine = engine();
    for line in engine.items() {
        info!(
            product_id = %line.product_id,
            name = %line.name,
            quantity = line.quantity,
            price = %line.price,
            line_total = %line.line_total(),
            "cart line"
        );
    }
    report(&engine, "guest cart");
}
