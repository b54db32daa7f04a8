//! In-memory reference backend.
//!
//! Implements both remote service traits against process-local state, so the
//! engines can be exercised without a real backend: one signed-in customer,
//! a seedable product catalog that drives sync validation, and failure
//! injection for unreachable/unauthorized simulation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use cartwheel_core::{
    CartItem, CartRecord, CartSyncOutcome, ProductId, ProductSummary, WishlistItem, WishlistRecord,
};

use super::{RemoteCartService, RemoteError, RemoteWishlistService};

/// In-memory implementation of the remote cart and wishlist services.
///
/// Cheaply cloneable; clones share the same records, catalog, and failure
/// switches.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<MemoryBackendInner>,
}

#[derive(Default)]
struct MemoryBackendInner {
    catalog: RwLock<HashMap<ProductId, ProductSummary>>,
    cart: RwLock<CartRecord>,
    wishlist: RwLock<WishlistRecord>,
    offline: AtomicBool,
    fail_next: AtomicBool,
    unauthorized: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product to the catalog, making its ID resolvable.
    pub fn seed_product(&self, product: ProductSummary) {
        self.catalog_mut()
            .insert(product.product_id.clone(), product);
    }

    /// Remove a product from the catalog, simulating catalog deletion.
    /// Existing cart/wishlist lines are left in place, as a real backend
    /// would leave stale denormalized lines.
    pub fn remove_product(&self, product_id: &ProductId) -> bool {
        self.catalog_mut().remove(product_id).is_some()
    }

    /// Toggle hard unavailability: every call fails until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail exactly the next call, then recover.
    pub fn fail_next(&self) {
        self.inner.fail_next.store(true, Ordering::SeqCst);
    }

    /// Toggle session rejection: every call fails with `Unauthorized`.
    pub fn set_unauthorized(&self, unauthorized: bool) {
        self.inner.unauthorized.store(unauthorized, Ordering::SeqCst);
    }

    /// The current server-side cart record.
    #[must_use]
    pub fn cart_record(&self) -> CartRecord {
        self.cart().clone()
    }

    /// Replace the server-side cart record (e.g. a pre-existing cart from an
    /// earlier session).
    pub fn set_cart_record(&self, record: CartRecord) {
        *self.cart_mut() = record;
    }

    /// The current server-side wishlist record.
    #[must_use]
    pub fn wishlist_record(&self) -> WishlistRecord {
        self.wishlist().clone()
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.inner.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RemoteError::Offline);
        }
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Offline);
        }
        if self.inner.unauthorized.load(Ordering::SeqCst) {
            return Err(RemoteError::Unauthorized("session expired".to_string()));
        }
        Ok(())
    }

    fn resolve(&self, product_id: &ProductId) -> Result<ProductSummary, RemoteError> {
        self.catalog()
            .get(product_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(product_id.to_string()))
    }

    // Lock poisoning cannot happen here: no code path panics while holding
    // a guard. The expects document that assumption.
    fn catalog(&self) -> RwLockReadGuard<'_, HashMap<ProductId, ProductSummary>> {
        self.inner.catalog.read().expect("catalog lock poisoned")
    }

    fn catalog_mut(&self) -> RwLockWriteGuard<'_, HashMap<ProductId, ProductSummary>> {
        self.inner.catalog.write().expect("catalog lock poisoned")
    }

    fn cart(&self) -> RwLockReadGuard<'_, CartRecord> {
        self.inner.cart.read().expect("cart lock poisoned")
    }

    fn cart_mut(&self) -> RwLockWriteGuard<'_, CartRecord> {
        self.inner.cart.write().expect("cart lock poisoned")
    }

    fn wishlist(&self) -> RwLockReadGuard<'_, WishlistRecord> {
        self.inner.wishlist.read().expect("wishlist lock poisoned")
    }

    fn wishlist_mut(&self) -> RwLockWriteGuard<'_, WishlistRecord> {
        self.inner.wishlist.write().expect("wishlist lock poisoned")
    }
}

/// Fold a line into a cart record: increment an existing line or append.
fn fold_into(record: &mut CartRecord, product: &ProductSummary, quantity: u32) {
    match record
        .items
        .iter_mut()
        .find(|line| line.product_id == product.product_id)
    {
        Some(line) => line.quantity = line.quantity.saturating_add(quantity),
        None => record.items.push(CartItem::new(product, quantity)),
    }
}

impl RemoteCartService for MemoryBackend {
    async fn get_cart(&self) -> Result<CartRecord, RemoteError> {
        self.check_available()?;
        Ok(self.cart_record())
    }

    async fn add_item(
        &self,
        product: &ProductSummary,
        quantity: u32,
    ) -> Result<CartRecord, RemoteError> {
        self.check_available()?;
        // The catalog's summary is the server truth for display fields
        let resolved = self.resolve(&product.product_id)?;
        let mut cart = self.cart_mut();
        fold_into(&mut cart, &resolved, quantity);
        Ok(cart.clone())
    }

    async fn update_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartRecord, RemoteError> {
        self.check_available()?;
        let mut cart = self.cart_mut();
        let line = cart
            .items
            .iter_mut()
            .find(|line| line.product_id == *product_id)
            .ok_or_else(|| RemoteError::NotFound(product_id.to_string()))?;
        line.quantity = quantity;
        Ok(cart.clone())
    }

    async fn remove_item(&self, product_id: &ProductId) -> Result<CartRecord, RemoteError> {
        self.check_available()?;
        let mut cart = self.cart_mut();
        cart.items.retain(|line| line.product_id != *product_id);
        Ok(cart.clone())
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        self.check_available()?;
        self.cart_mut().items.clear();
        Ok(())
    }

    async fn sync_cart(&self, local_items: &[CartItem]) -> Result<CartSyncOutcome, RemoteError> {
        self.check_available()?;
        let mut valid_products = Vec::new();
        let mut invalid_products = Vec::new();
        let mut cart = self.cart_mut();

        for line in local_items {
            match self.catalog().get(&line.product_id).cloned() {
                Some(resolved) => {
                    fold_into(&mut cart, &resolved, line.quantity);
                    valid_products.push(line.name.clone());
                }
                None => invalid_products.push(line.name.clone()),
            }
        }

        Ok(CartSyncOutcome {
            cart: cart.clone(),
            valid_products,
            invalid_products,
        })
    }
}

impl RemoteWishlistService for MemoryBackend {
    async fn get_wishlist(&self) -> Result<WishlistRecord, RemoteError> {
        self.check_available()?;
        Ok(self.wishlist_record())
    }

    async fn add_item(&self, product_id: &ProductId) -> Result<(), RemoteError> {
        self.check_available()?;
        let resolved = self.resolve(product_id)?;
        let mut wishlist = self.wishlist_mut();
        if wishlist
            .items
            .iter()
            .any(|entry| entry.product_id == *product_id)
        {
            return Ok(());
        }
        wishlist.items.push(WishlistItem::new(&resolved, Utc::now()));
        Ok(())
    }

    async fn remove_item(&self, product_id: &ProductId) -> Result<(), RemoteError> {
        self.check_available()?;
        self.wishlist_mut()
            .items
            .retain(|entry| entry.product_id != *product_id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        self.check_available()?;
        self.wishlist_mut().items.clear();
        Ok(())
    }

    async fn move_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<(), RemoteError> {
        self.check_available()?;
        let present = self
            .wishlist()
            .items
            .iter()
            .any(|entry| entry.product_id == *product_id);
        if !present {
            return Err(RemoteError::NotFound(product_id.to_string()));
        }

        let resolved = self.resolve(product_id)?;
        fold_into(&mut self.cart_mut(), &resolved, quantity);
        self.wishlist_mut()
            .items
            .retain(|entry| entry.product_id != *product_id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(id: &str) -> ProductSummary {
        ProductSummary::new(id, format!("Product {id}"), Decimal::new(1000, 2), None).unwrap()
    }

    fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.seed_product(product("a"));
        backend.seed_product(product("b"));
        backend
    }

    #[tokio::test]
    async fn test_add_folds_server_side() {
        let backend = seeded();
        RemoteCartService::add_item(&backend, &product("a"), 1).await.unwrap();
        let record = RemoteCartService::add_item(&backend, &product("a"), 2).await.unwrap();
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let backend = seeded();
        let err = RemoteCartService::add_item(&backend, &product("ghost"), 1).await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sync_reports_invalid_products() {
        let backend = seeded();
        backend.remove_product(&ProductId::new("b"));

        let local = vec![
            CartItem::new(&product("a"), 2),
            CartItem::new(&product("b"), 1),
        ];
        let outcome = backend.sync_cart(&local).await.unwrap();

        assert_eq!(outcome.cart.items.len(), 1);
        assert_eq!(outcome.cart.items[0].quantity, 2);
        assert_eq!(outcome.valid_products, vec!["Product a".to_string()]);
        assert_eq!(outcome.invalid_products, vec!["Product b".to_string()]);
    }

    #[tokio::test]
    async fn test_fail_next_fails_once_then_recovers() {
        let backend = seeded();
        backend.fail_next();
        assert!(backend.get_cart().await.is_err());
        assert!(backend.get_cart().await.is_ok());
    }

    #[tokio::test]
    async fn test_wishlist_add_is_idempotent() {
        let backend = seeded();
        let id = ProductId::new("a");
        RemoteWishlistService::add_item(&backend, &id).await.unwrap();
        RemoteWishlistService::add_item(&backend, &id).await.unwrap();
        assert_eq!(backend.wishlist_record().items.len(), 1);
    }

    #[tokio::test]
    async fn test_move_to_cart_transfers_entry() {
        let backend = seeded();
        let id = ProductId::new("a");
        RemoteWishlistService::add_item(&backend, &id).await.unwrap();
        backend.move_to_cart(&id, 2).await.unwrap();

        assert!(backend.wishlist_record().items.is_empty());
        assert_eq!(backend.cart_record().items[0].quantity, 2);
    }
}
