//! Cartwheel Sync - dual-mode cart and wishlist synchronization engines.
//!
//! This crate keeps a shopping cart and a wishlist consistent across two
//! divergent persistence models:
//!
//! - **Guest mode**: mutations apply to the in-memory list and persist to a
//!   durable local snapshot after every successful mutation.
//! - **Authenticated mode**: mutations go to the remote per-user record; the
//!   server's returned state replaces the in-memory list wholesale.
//!
//! Signing in with a non-empty guest snapshot runs the merge protocol: the
//! snapshot is submitted to the remote cart service, lines whose product no
//! longer resolves are dropped (and disclosed by name), the canonical server
//! cart is adopted, and the snapshot is cleared.
//!
//! # Architecture
//!
//! - Engines are explicitly constructed instances injected into consumers;
//!   there is no ambient global state.
//! - Mutating operations on one engine are serialized; reads are synchronous
//!   and never trigger I/O.
//! - The remote services are trait seams ([`remote::RemoteCartService`],
//!   [`remote::RemoteWishlistService`]) with a REST adapter
//!   ([`remote::ApiClient`]) and an in-memory reference backend
//!   ([`remote::MemoryBackend`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use cartwheel_sync::remote::MemoryBackend;
//! use cartwheel_sync::snapshot::MemorySnapshotStore;
//! use cartwheel_sync::{CartEngine, SessionSignal, WishlistEngine};
//!
//! let backend = MemoryBackend::new();
//! let cart = CartEngine::new(backend.clone(), Arc::new(MemorySnapshotStore::new()));
//! let wishlist = WishlistEngine::new(
//!     backend,
//!     cart.clone(),
//!     Arc::new(MemorySnapshotStore::new()),
//! );
//!
//! let session = SessionSignal::new();
//! tokio::spawn(cartwheel_sync::session::drive(
//!     session.subscribe(),
//!     cart.clone(),
//!     wishlist.clone(),
//! ));
//!
//! cart.add_item(&product, 1).await?;
//! session.sign_in("user-1".into()); // triggers the merge protocol
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod merge;
pub mod remote;
pub mod session;
pub mod snapshot;
pub mod wishlist;

pub use cart::CartEngine;
pub use error::{EngineError, Result};
pub use merge::MergeOutcome;
pub use session::{PersistenceMode, SessionSignal, SessionState};
pub use wishlist::WishlistEngine;
