//! Wishlist synchronization engine.
//!
//! Structurally the cart engine without quantities: the same
//! guest/authenticated state machine, the same snapshot-backed guest
//! persistence, and an idempotent `add_item`. Two differences of substance:
//!
//! - `move_item_to_cart` hands an entry off to the cart engine as one
//!   logical unit: the wishlist entry is removed only after the cart add
//!   succeeded, so a failed add leaves the entry in place for retry.
//! - The wishlist collaborator has no bulk sync operation, so the sign-in
//!   merge replays the guest snapshot through the remote's idempotent
//!   `add_item` and then adopts the fetched server list. Entries whose
//!   product no longer resolves are dropped and disclosed, as in the cart
//!   merge.
//!
//! Remote wishlist mutations acknowledge without returning a record. After
//! a confirmed removal or clear the mirrored list is updated directly; adds
//! re-fetch the record because the server assigns the entry's `added_at`.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use cartwheel_core::{ProductId, ProductSummary, UserId, WishlistItem};

use crate::cart::CartEngine;
use crate::error::{EngineError, Result, unresolvable_as_invalid};
use crate::merge::MergeOutcome;
use crate::remote::{RemoteCartService, RemoteError, RemoteWishlistService};
use crate::session::PersistenceMode;
use crate::snapshot::SnapshotStore;

/// The wishlist synchronization engine.
///
/// Cheaply cloneable; clones share the same state and operation gate.
pub struct WishlistEngine<W, C> {
    inner: Arc<WishlistEngineInner<W, C>>,
}

impl<W, C> Clone for WishlistEngine<W, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct WishlistEngineInner<W, C> {
    remote: W,
    cart: CartEngine<C>,
    snapshot: Arc<dyn SnapshotStore<WishlistItem>>,
    state: RwLock<WishlistState>,
    // Serializes mutating operations and the merge protocol
    op_gate: Mutex<()>,
}

struct WishlistState {
    mode: PersistenceMode,
    items: Vec<WishlistItem>,
}

impl<W, C> WishlistEngine<W, C>
where
    W: RemoteWishlistService,
    C: RemoteCartService,
{
    /// Create an engine in guest mode, adopting whatever the snapshot holds.
    #[must_use]
    pub fn new(
        remote: W,
        cart: CartEngine<C>,
        snapshot: Arc<dyn SnapshotStore<WishlistItem>>,
    ) -> Self {
        let items = snapshot.load();
        Self {
            inner: Arc::new(WishlistEngineInner {
                remote,
                cart,
                snapshot,
                state: RwLock::new(WishlistState {
                    mode: PersistenceMode::Guest,
                    items,
                }),
                op_gate: Mutex::new(()),
            }),
        }
    }

    /// The current wishlist entries.
    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.state().items.clone()
    }

    /// Whether the wishlist currently holds an entry for the product.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.state()
            .items
            .iter()
            .any(|entry| entry.product_id == *product_id)
    }

    /// The currently authoritative persistence mode.
    #[must_use]
    pub fn mode(&self) -> PersistenceMode {
        self.state().mode.clone()
    }

    /// Whether the remote backend is currently authoritative.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().mode.is_authenticated()
    }

    /// Add a product to the wishlist. Idempotent: adding a product that is
    /// already present is a successful no-op.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] for an empty or unresolvable product
    /// identifier; remote failures per [`EngineError`], with the in-memory
    /// list unchanged.
    #[instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub async fn add_item(&self, product: &ProductSummary) -> Result<()> {
        if product.product_id.is_empty() {
            return Err(EngineError::InvalidInput(
                "product id cannot be empty".to_string(),
            ));
        }

        let _gate = self.inner.op_gate.lock().await;
        if self.contains(&product.product_id) {
            debug!("product already wishlisted; add is a no-op");
            return Ok(());
        }

        if self.is_authenticated() {
            self.inner
                .remote
                .add_item(&product.product_id)
                .await
                .map_err(unresolvable_as_invalid)?;
            let record = self.inner.remote.get_wishlist().await?;
            self.state_mut().items = record.items;
        } else {
            let mut state = self.state_mut();
            state.items.push(WishlistItem::new(product, Utc::now()));
            self.inner.snapshot.save(&state.items);
        }
        Ok(())
    }

    /// Remove an entry. Returns whether a removal actually occurred;
    /// removing an absent entry is not an error.
    ///
    /// # Errors
    ///
    /// Remote failures per [`EngineError`], with the in-memory list
    /// unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<bool> {
        let _gate = self.inner.op_gate.lock().await;
        if !self.contains(product_id) {
            debug!("remove of absent entry is a no-op");
            return Ok(false);
        }

        if self.is_authenticated() {
            self.inner.remote.remove_item(product_id).await?;
        }
        let mut state = self.state_mut();
        state.items.retain(|entry| entry.product_id != *product_id);
        if !state.mode.is_authenticated() {
            self.inner.snapshot.save(&state.items);
        }
        Ok(true)
    }

    /// Empty the wishlist and its backing store.
    ///
    /// # Errors
    ///
    /// Remote failures per [`EngineError`], with the in-memory list
    /// unchanged.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let _gate = self.inner.op_gate.lock().await;
        if self.is_authenticated() {
            self.inner.remote.clear().await?;
            self.state_mut().items.clear();
        } else {
            self.state_mut().items.clear();
            self.inner.snapshot.clear();
        }
        Ok(())
    }

    /// Move an entry into the cart as one logical unit.
    ///
    /// The cart add runs first; only once it has succeeded is the entry
    /// removed from the wishlist. If the cart add fails, the wishlist is
    /// left untouched so the user can retry.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] for a zero quantity,
    /// [`EngineError::NotFound`] if the product is not wishlisted, and any
    /// error surfaced by the cart add or the wishlist removal.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn move_item_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(EngineError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }

        let _gate = self.inner.op_gate.lock().await;
        let entry = self
            .state()
            .items
            .iter()
            .find(|entry| entry.product_id == *product_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(product_id.to_string()))?;

        self.inner.cart.add_item(&entry.summary(), quantity).await?;

        if self.is_authenticated() {
            self.inner.remote.remove_item(product_id).await?;
        }
        let mut state = self.state_mut();
        state.items.retain(|entry| entry.product_id != *product_id);
        if !state.mode.is_authenticated() {
            self.inner.snapshot.save(&state.items);
        }
        Ok(())
    }

    /// Transition guest → authenticated, merging the guest snapshot.
    ///
    /// The snapshot is replayed through the remote's idempotent `add_item`,
    /// then the server list is fetched and adopted and the snapshot
    /// cleared. Entries whose product no longer resolves are dropped and
    /// reported in the returned [`MergeOutcome`]. A total failure leaves
    /// the snapshot and the guest list intact; replay makes a retried
    /// sign-in safe.
    ///
    /// # Errors
    ///
    /// Remote failures per [`EngineError`]; the engine stays in guest mode.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn handle_sign_in(&self, user_id: UserId) -> Result<MergeOutcome> {
        let _gate = self.inner.op_gate.lock().await;
        if self.is_authenticated() {
            debug!("already authenticated; merge runs at most once per sign-in");
            return Ok(MergeOutcome::default());
        }

        let local = self.inner.snapshot.load();
        let mut dropped_products = Vec::new();
        for entry in &local {
            match self.inner.remote.add_item(&entry.product_id).await {
                Ok(()) => {}
                Err(RemoteError::NotFound(_)) => dropped_products.push(entry.name.clone()),
                Err(e) => return Err(e.into()),
            }
        }
        if !dropped_products.is_empty() {
            warn!(
                dropped = ?dropped_products,
                "merge dropped entries whose product no longer resolves"
            );
        }

        let record = self.inner.remote.get_wishlist().await?;
        let mut state = self.state_mut();
        state.items = record.items;
        state.mode = PersistenceMode::Authenticated { user_id };
        drop(state);
        self.inner.snapshot.clear();

        Ok(MergeOutcome { dropped_products })
    }

    /// Transition authenticated → guest: reset to an empty guest wishlist.
    #[instrument(skip(self))]
    pub async fn handle_sign_out(&self) {
        let _gate = self.inner.op_gate.lock().await;
        let mut state = self.state_mut();
        if !state.mode.is_authenticated() {
            return;
        }
        state.mode = PersistenceMode::Guest;
        state.items = Vec::new();
    }

    // Lock poisoning cannot happen here: no code path panics while holding
    // a guard.
    fn state(&self) -> RwLockReadGuard<'_, WishlistState> {
        self.inner
            .state
            .read()
            .expect("wishlist state lock poisoned")
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, WishlistState> {
        self.inner
            .state
            .write()
            .expect("wishlist state lock poisoned")
    }
}
