//! Durable local snapshot storage for guest-mode item lists.
//!
//! While no authenticated session exists, every successful mutation is
//! persisted here; the snapshot is also the input to the merge protocol on
//! sign-in. The store favors availability over strict validation: an absent
//! or malformed payload loads as an empty list, and save failures are logged
//! rather than surfaced.
//!
//! All operations are synchronous and never suspend; engines call them only
//! after the corresponding in-memory mutation has completed.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Well-known snapshot file names, one per collection.
pub mod files {
    /// Guest cart snapshot.
    pub const CART: &str = "cart.json";

    /// Guest wishlist snapshot.
    pub const WISHLIST: &str = "wishlist.json";
}

/// Durable storage for a serialized item list.
///
/// Written only by the engine currently in guest mode, and only after an
/// in-memory mutation has been confirmed.
pub trait SnapshotStore<T>: Send + Sync {
    /// Load the stored list. Absent or corrupt payloads load as empty.
    fn load(&self) -> Vec<T>;

    /// Overwrite the stored snapshot. Side effect only; failures are logged,
    /// never surfaced.
    fn save(&self, items: &[T]);

    /// Remove the snapshot entirely.
    fn clear(&self);
}

/// File-backed snapshot store: one JSON file per collection.
///
/// The durable local-storage analog for native clients. The parent directory
/// is created on first save.
pub struct FileSnapshotStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FileSnapshotStore<T> {
    /// Create a store persisting to the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// The file this store persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> SnapshotStore<T> for FileSnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> Vec<T> {
        let payload = match fs::read_to_string(&self.path) {
            Ok(payload) => payload,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read snapshot");
                return Vec::new();
            }
        };

        parse_payload(&payload)
    }

    fn save(&self, items: &[T]) {
        let payload = match serde_json::to_string(items) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to serialize snapshot");
                return;
            }
        };

        if let Some(parent) = self.path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), error = %e, "failed to create snapshot directory");
            return;
        }

        if let Err(e) = fs::write(&self.path, payload) {
            warn!(path = %self.path.display(), error = %e, "failed to write snapshot");
        }
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "failed to remove snapshot");
        }
    }
}

/// In-memory snapshot store holding a raw string payload.
///
/// Mirrors how a browser's local storage holds a serialized string under a
/// key. Used by tests and the demo; `set_raw` allows exercising the
/// corrupt-payload path directly.
#[derive(Default)]
pub struct MemorySnapshotStore<T> {
    payload: RwLock<Option<String>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemorySnapshotStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            payload: RwLock::new(None),
            _marker: PhantomData,
        }
    }

    /// Replace the raw payload, bypassing serialization.
    pub fn set_raw(&self, payload: impl Into<String>) {
        if let Ok(mut slot) = self.payload.write() {
            *slot = Some(payload.into());
        }
    }

    /// The raw stored payload, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.payload.read().ok().and_then(|slot| slot.clone())
    }
}

impl<T> SnapshotStore<T> for MemorySnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> Vec<T> {
        self.raw().map_or_else(Vec::new, |payload| parse_payload(&payload))
    }

    fn save(&self, items: &[T]) {
        match serde_json::to_string(items) {
            Ok(payload) => self.set_raw(payload),
            Err(e) => warn!(error = %e, "failed to serialize snapshot"),
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.payload.write() {
            *slot = None;
        }
    }
}

/// Parse a stored payload, treating malformed content as empty.
fn parse_payload<T: DeserializeOwned>(payload: &str) -> Vec<T> {
    match serde_json::from_str(payload) {
        Ok(items) => items,
        Err(e) => {
            debug!(error = %e, "snapshot payload is malformed; treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use cartwheel_core::{CartItem, ProductSummary};
    use rust_decimal::Decimal;

    fn item(id: &str, quantity: u32) -> CartItem {
        let product =
            ProductSummary::new(id, format!("Product {id}"), Decimal::new(999, 2), None).unwrap();
        CartItem::new(&product, quantity)
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySnapshotStore::new();
        store.save(&[item("a", 2), item("b", 1)]);

        let loaded: Vec<CartItem> = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].quantity, 2);
    }

    #[test]
    fn test_absent_snapshot_loads_empty() {
        let store = MemorySnapshotStore::<CartItem>::new();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupt_payload_loads_empty() {
        let store = MemorySnapshotStore::<CartItem>::new();
        store.set_raw("{not json");
        assert!(store.load().is_empty());

        // Valid JSON of the wrong shape is also treated as empty
        store.set_raw(r#"{"items": 7}"#);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_clear_removes_payload() {
        let store = MemorySnapshotStore::new();
        store.save(&[item("a", 1)]);
        SnapshotStore::<CartItem>::clear(&store);
        assert!(store.raw().is_none());
        assert!(SnapshotStore::<CartItem>::load(&store).is_empty());
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let path = std::env::temp_dir()
            .join("cartwheel-tests")
            .join(format!("cart-{}.json", uuid::Uuid::new_v4()));
        let store = FileSnapshotStore::new(&path);

        assert!(SnapshotStore::<CartItem>::load(&store).is_empty());

        store.save(&[item("a", 3)]);
        let loaded: Vec<CartItem> = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].quantity, 3);

        SnapshotStore::<CartItem>::clear(&store);
        assert!(!path.exists());
        assert!(SnapshotStore::<CartItem>::load(&store).is_empty());
    }

    #[test]
    fn test_file_store_corrupt_payload_loads_empty() {
        let path = std::env::temp_dir()
            .join("cartwheel-tests")
            .join(format!("corrupt-{}.json", uuid::Uuid::new_v4()));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "][").unwrap();

        let store = FileSnapshotStore::<CartItem>::new(&path);
        assert!(store.load().is_empty());

        let _ = fs::remove_file(&path);
    }
}
