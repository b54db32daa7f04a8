//! Session signal and mode transitions.
//!
//! The auth subsystem is an external collaborator; all the engines see of it
//! is a [`SessionSignal`]: the current [`SessionState`] plus a change
//! notification. The [`drive`] future subscribes to the signal and
//! translates transitions into engine calls, so a guest→authenticated
//! transition runs the merge protocol and an authenticated→guest transition
//! resets the engines.

use tokio::sync::watch;
use tracing::{debug, warn};

use cartwheel_core::UserId;

use crate::cart::CartEngine;
use crate::remote::{RemoteCartService, RemoteWishlistService};
use crate::wishlist::WishlistEngine;

/// Authentication state as seen by the engines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The signed-in user, or `None` for a guest.
    pub user_id: Option<UserId>,
}

impl SessionState {
    /// A guest session.
    #[must_use]
    pub const fn guest() -> Self {
        Self { user_id: None }
    }

    /// An authenticated session for the given user.
    #[must_use]
    pub const fn signed_in(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Whether a user is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Which persistence backend is currently authoritative for an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    /// No session: mutations apply in memory and persist to the local
    /// snapshot.
    Guest,
    /// Signed in: the remote per-user record is authoritative.
    Authenticated {
        /// The signed-in user.
        user_id: UserId,
    },
}

impl PersistenceMode {
    /// Whether the remote backend is authoritative.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Publisher side of the session signal.
///
/// The embedding app calls [`sign_in`](Self::sign_in) and
/// [`sign_out`](Self::sign_out) as the auth subsystem reports transitions;
/// engines observe them through [`subscribe`](Self::subscribe) receivers.
#[derive(Debug)]
pub struct SessionSignal {
    tx: watch::Sender<SessionState>,
}

impl SessionSignal {
    /// Create a signal starting in the guest state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(SessionState::guest()),
        }
    }

    /// Publish a sign-in for the given user.
    pub fn sign_in(&self, user_id: UserId) {
        self.tx.send_replace(SessionState::signed_in(user_id));
    }

    /// Publish a sign-out.
    pub fn sign_out(&self) {
        self.tx.send_replace(SessionState::guest());
    }

    /// The current session state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Subscribe to session transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive both engines off a session signal subscription.
///
/// Runs until the [`SessionSignal`] is dropped. Merge outcomes and failures
/// are logged here; an app that wants to present them (e.g. "these products
/// are no longer available") should call the engines'
/// `handle_sign_in`/`handle_sign_out` directly instead of spawning this.
pub async fn drive<C, W>(
    mut rx: watch::Receiver<SessionState>,
    cart: CartEngine<C>,
    wishlist: WishlistEngine<W, C>,
) where
    C: RemoteCartService,
    W: RemoteWishlistService,
{
    loop {
        if rx.changed().await.is_err() {
            debug!("session signal dropped; stopping driver");
            break;
        }
        let state = rx.borrow_and_update().clone();
        apply_transition(&state, &cart, &wishlist).await;
    }
}

async fn apply_transition<C, W>(
    state: &SessionState,
    cart: &CartEngine<C>,
    wishlist: &WishlistEngine<W, C>,
) where
    C: RemoteCartService,
    W: RemoteWishlistService,
{
    match &state.user_id {
        Some(user_id) => {
            match cart.handle_sign_in(user_id.clone()).await {
                Ok(outcome) if !outcome.is_clean() => {
                    warn!(
                        dropped = ?outcome.dropped_products,
                        "cart merge dropped products that no longer resolve"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "cart merge failed; snapshot retained for retry");
                }
            }
            match wishlist.handle_sign_in(user_id.clone()).await {
                Ok(outcome) if !outcome.is_clean() => {
                    warn!(
                        dropped = ?outcome.dropped_products,
                        "wishlist merge dropped products that no longer resolve"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "wishlist merge failed; snapshot retained for retry");
                }
            }
        }
        None => {
            cart.handle_sign_out().await;
            wishlist.handle_sign_out().await;
        }
    }
}
