//! Cart synchronization engine.
//!
//! Owns the canonical in-memory cart line list and keeps it synchronized
//! with whichever backend is currently authoritative:
//!
//! - **Guest**: mutations apply in memory and persist to the local snapshot
//!   after every successful mutation.
//! - **Authenticated**: mutations go to the remote cart service; the
//!   record it returns replaces the in-memory list wholesale (no piecemeal
//!   local merging, no optimistic mutation).
//!
//! Mutating operations are serialized through an internal gate, so two
//! in-flight remote mutations can never interleave and a merge in flight
//! blocks the operations queued behind it. Reads are synchronous and never
//! trigger I/O.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use cartwheel_core::{CartItem, CartTotals, ProductId, ProductSummary, UserId};

use crate::error::{EngineError, Result, unresolvable_as_invalid};
use crate::merge::MergeOutcome;
use crate::remote::RemoteCartService;
use crate::session::PersistenceMode;
use crate::snapshot::SnapshotStore;

/// The cart synchronization engine.
///
/// Cheaply cloneable; clones share the same state and operation gate. The
/// engine exclusively owns its in-memory list: consumers read it and invoke
/// operations, never mutate it directly.
pub struct CartEngine<R> {
    inner: Arc<CartEngineInner<R>>,
}

impl<R> Clone for CartEngine<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CartEngineInner<R> {
    remote: R,
    snapshot: Arc<dyn SnapshotStore<CartItem>>,
    state: RwLock<CartState>,
    // Serializes mutating operations and the merge protocol
    op_gate: Mutex<()>,
}

struct CartState {
    mode: PersistenceMode,
    items: Vec<CartItem>,
}

impl<R: RemoteCartService> CartEngine<R> {
    /// Create an engine in guest mode, adopting whatever the snapshot holds.
    #[must_use]
    pub fn new(remote: R, snapshot: Arc<dyn SnapshotStore<CartItem>>) -> Self {
        let items = snapshot.load();
        Self {
            inner: Arc::new(CartEngineInner {
                remote,
                snapshot,
                state: RwLock::new(CartState {
                    mode: PersistenceMode::Guest,
                    items,
                }),
                op_gate: Mutex::new(()),
            }),
        }
    }

    /// The current cart lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state().items.clone()
    }

    /// Derived totals over the current lines. Pure read; never triggers I/O.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::of(&self.state().items)
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

    /// Add a product to the cart, folding into an existing line.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] for a zero quantity or an empty or
    /// unresolvable product identifier; remote failures per
    /// [`EngineError`], with the in-memory list unchanged.
    #[instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub async fn add_item(&self, product: &ProductSummary, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(EngineError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }
        if product.product_id.is_empty() {
            return Err(EngineError::InvalidInput(
                "product id cannot be empty".to_string(),
            ));
        }

        let _gate = self.inner.op_gate.lock().await;
        if self.is_authenticated() {
            let record = self
                .inner
                .remote
                .add_item(product, quantity)
                .await
                .map_err(unresolvable_as_invalid)?;
            self.adopt(record.items);
        } else {
            let mut state = self.state_mut();
            match state
                .items
                .iter_mut()
                .find(|line| line.product_id == product.product_id)
            {
                Some(line) => line.quantity = line.quantity.saturating_add(quantity),
                None => state.items.push(CartItem::new(product, quantity)),
            }
            self.inner.snapshot.save(&state.items);
        }
        Ok(())
    }

    /// Set the quantity of an existing line. A quantity of zero is a
    /// removal, not a stored zero.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if no line exists for the product; remote
    /// failures per [`EngineError`], with the in-memory list unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_item(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove_item(product_id).await.map(|_| ());
        }

        let _gate = self.inner.op_gate.lock().await;
        if self.is_authenticated() {
            let record = self.inner.remote.update_item(product_id, quantity).await?;
            self.adopt(record.items);
        } else {
            let mut state = self.state_mut();
            let line = state
                .items
                .iter_mut()
                .find(|line| line.product_id == *product_id)
                .ok_or_else(|| EngineError::NotFound(product_id.to_string()))?;
            line.quantity = quantity;
            self.inner.snapshot.save(&state.items);
        }
        Ok(())
    }

    /// Remove a line. Returns whether a removal actually occurred; removing
    /// an absent line is not an error.
    ///
    /// # Errors
    ///
    /// Remote failures per [`EngineError`], with the in-memory list
    /// unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<bool> {
        let _gate = self.inner.op_gate.lock().await;
        let present = self
            .state()
            .items
            .iter()
            .any(|line| line.product_id == *product_id);
        if !present {
            debug!("remove of absent line is a no-op");
            return Ok(false);
        }

        if self.is_authenticated() {
            let record = self.inner.remote.remove_item(product_id).await?;
            self.adopt(record.items);
        } else {
            let mut state = self.state_mut();
            state.items.retain(|line| line.product_id != *product_id);
            self.inner.snapshot.save(&state.items);
        }
        Ok(true)
    }

    /// Empty the cart and its backing store.
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

    /// Transition guest → authenticated, running the merge protocol.
    ///
    /// With a non-empty snapshot, the snapshot is submitted to the remote
    /// sync operation; the canonical server cart is adopted and the snapshot
    /// cleared. Lines dropped because their product no longer resolves are
    /// reported in the returned [`MergeOutcome`]. With an empty snapshot,
    /// the server cart is simply fetched and adopted.
    ///
    /// At most once per sign-in: calling while already authenticated is a
    /// no-op. A total failure leaves the snapshot and the guest list intact,
    /// so a retried sign-in re-runs the merge.
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
        if local.is_empty() {
            let record = self.inner.remote.get_cart().await?;
            let mut state = self.state_mut();
            state.items = record.items;
            state.mode = PersistenceMode::Authenticated { user_id };
            self.inner.snapshot.clear();
            return Ok(MergeOutcome::default());
        }

        debug!(lines = local.len(), "merging guest cart into account");
        let outcome = self.inner.remote.sync_cart(&local).await?;
        if !outcome.invalid_products.is_empty() {
            warn!(
                dropped = ?outcome.invalid_products,
                "merge dropped lines whose product no longer resolves"
            );
        }

        let mut state = self.state_mut();
        state.items = outcome.cart.items;
        state.mode = PersistenceMode::Authenticated { user_id };
        drop(state);
        // The snapshot has been superseded by the server cart
        self.inner.snapshot.clear();

        Ok(MergeOutcome {
            dropped_products: outcome.invalid_products,
        })
    }

    /// Transition authenticated → guest: reset to an empty guest cart.
    ///
    /// The server cart remains server-side, untouched; nothing is merged
    /// back into local storage.
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

    /// Replace the in-memory list with a record returned by the remote.
    fn adopt(&self, items: Vec<CartItem>) {
        self.state_mut().items = items;
    }

    // Lock poisoning cannot happen here: no code path panics while holding
    // a guard.
    fn state(&self) -> RwLockReadGuard<'_, CartState> {
        self.inner.state.read().expect("cart state lock poisoned")
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, CartState> {
        self.inner.state.write().expect("cart state lock poisoned")
    }
}
