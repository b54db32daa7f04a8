//! Merge protocol outcome.

/// Non-fatal outcome of a sign-in merge.
///
/// A merge succeeds even when some guest lines are dropped because their
/// product no longer resolves server-side. The dropped display names are
/// carried here so the UI can disclose them rather than letting the cart
/// silently shrink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Display names of guest lines dropped by the merge.
    pub dropped_products: Vec<String>,
}

impl MergeOutcome {
    /// Whether every guest line survived the merge.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped_products.is_empty()
    }
}
