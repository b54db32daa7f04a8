//! Remote cart and wishlist service boundary.
//!
//! # Architecture
//!
//! The remote services are external collaborators; the engines see them only
//! through the traits below. Two implementations ship with the crate:
//!
//! - [`ApiClient`] - JSON REST adapter for a real backend
//! - [`MemoryBackend`] - in-memory reference backend for tests and demos
//!
//! Cart mutations return the full per-user [`CartRecord`]: after any remote
//! call, the server response is the single source of truth and the engine
//! replaces its in-memory list with it. Wishlist mutations acknowledge only;
//! the engine re-fetches where the server assigns data it cannot know.

mod memory;
mod rest;

pub use memory::MemoryBackend;
pub use rest::ApiClient;

use std::future::Future;

use thiserror::Error;

use cartwheel_core::{CartItem, CartRecord, CartSyncOutcome, ProductId, ProductSummary, WishlistRecord};

/// Errors that can occur when talking to a remote backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport failure (connection, timeout, redirect loop).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// The backend rejected the session (expired or invalid token).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The referenced entity does not exist on the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Client construction failed (malformed token or base URL).
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The backend is unreachable (reference backend failure injection).
    #[error("backend offline")]
    Offline,
}

/// Per-user cart record operations.
pub trait RemoteCartService: Send + Sync + 'static {
    /// Fetch the current cart record.
    fn get_cart(&self) -> impl Future<Output = Result<CartRecord, RemoteError>> + Send;

    /// Add a product to the cart, folding into an existing line server-side.
    /// Returns the resulting canonical record.
    fn add_item(
        &self,
        product: &ProductSummary,
        quantity: u32,
    ) -> impl Future<Output = Result<CartRecord, RemoteError>> + Send;

    /// Set the quantity of an existing line. Returns the resulting canonical
    /// record.
    fn update_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<CartRecord, RemoteError>> + Send;

    /// Remove a line. Returns the resulting canonical record.
    fn remove_item(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<CartRecord, RemoteError>> + Send;

    /// Empty the cart record.
    fn clear(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Merge a guest snapshot into the cart record. Lines whose product no
    /// longer resolves are dropped and reported by display name.
    fn sync_cart(
        &self,
        local_items: &[CartItem],
    ) -> impl Future<Output = Result<CartSyncOutcome, RemoteError>> + Send;
}

/// Per-user wishlist record operations.
pub trait RemoteWishlistService: Send + Sync + 'static {
    /// Fetch the current wishlist record.
    fn get_wishlist(&self) -> impl Future<Output = Result<WishlistRecord, RemoteError>> + Send;

    /// Add a product to the wishlist. Idempotent: adding a present product
    /// succeeds without effect. The server resolves display fields and
    /// assigns the insertion timestamp.
    fn add_item(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Remove an entry.
    fn remove_item(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Empty the wishlist record.
    fn clear(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Server-side move of an entry into the cart.
    ///
    /// Part of the collaborator contract; the engines perform the move as a
    /// client-side composite instead so the cart engine's list is updated by
    /// its own backend call.
    fn move_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
