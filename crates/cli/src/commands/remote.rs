//! Remote record inspection through the REST adapter.
//!
//! # Environment Variables
//!
//! - `CARTWHEEL_API_BASE_URL` - Base URL of the cart/wishlist API
//! - `CARTWHEEL_API_TOKEN` - Bearer token for the API

use tracing::info;

use cartwheel_core::CartTotals;
use cartwheel_sync::config::SyncConfig;
use cartwheel_sync::remote::{ApiClient, RemoteCartService, RemoteWishlistService};

fn client() -> Result<ApiClient, Box<dyn std::error::Error>> {
    let config = SyncConfig::from_env()?;
    Ok(ApiClient::new(&config.api)?)
}

/// Print the remote cart record.
pub async fn show_cart() -> Result<(), Box<dyn std::error::Error>> {
    let record = client()?.get_cart().await?;
    for line in &record.items {
        info!(
            product_id = %line.product_id,
            name = %line.name,
            quantity = line.quantity,
            price = %line.price,
            "cart line"
        );
    }
    let totals = CartTotals::of(&record.items);
    info!(
        lines = record.items.len(),
        total_quantity = totals.total_quantity,
        total_price = %totals.total_price,
        "remote cart"
    );
    Ok(())
}

/// Print the remote wishlist record.
pub async fn show_wishlist() -> Result<(), Box<dyn std::error::Error>> {
    let record = client()?.get_wishlist().await?;
    for entry in &record.items {
        info!(
            product_id = %entry.product_id,
            name = %entry.name,
            price = %entry.price,
            added_at = %entry.added_at,
            "wishlist entry"
        );
    }
    info!(entries = record.items.len(), "remote wishlist");
    Ok(())
}
