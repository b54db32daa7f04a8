//! Engine-facing error taxonomy.
//!
//! All engine operations return [`EngineError`]. Input-validation and
//! not-found errors are resolved locally with no retry; unreachable and
//! unauthorized errors are surfaced with the pre-operation state intact,
//! leaving retry decisions to the caller.
//!
//! A partial merge is NOT an error: it is reported through
//! [`crate::MergeOutcome`] alongside a successful result.

use thiserror::Error;

use cartwheel_core::ItemError;

use crate::remote::RemoteError;

/// Errors surfaced by the cart and wishlist synchronization engines.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before any I/O: non-positive quantity, missing or
    /// unresolvable product identifier.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation referenced a line item that does not exist in the
    /// current list.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote backend could not be reached or failed; the operation was
    /// aborted with the in-memory state unchanged.
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// The remote rejected the call due to an expired or invalid session.
    /// Surfaced for the auth subsystem to handle; local state is intact.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl From<RemoteError> for EngineError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unauthorized(message) => Self::Unauthorized(message),
            RemoteError::NotFound(what) => Self::NotFound(what),
            other => Self::Unreachable(other.to_string()),
        }
    }
}

impl From<ItemError> for EngineError {
    fn from(err: ItemError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias for [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// An add that references a product the backend cannot resolve is an input
/// error, not a missing line.
pub(crate) fn unresolvable_as_invalid(err: RemoteError) -> EngineError {
    match err {
        RemoteError::NotFound(what) => {
            EngineError::InvalidInput(format!("product does not resolve: {what}"))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_unauthorized_maps_to_unauthorized() {
        let err = EngineError::from(RemoteError::Unauthorized("token expired".to_string()));
        assert!(matches!(err, EngineError::Unauthorized(_)));
    }

    #[test]
    fn test_remote_not_found_maps_to_not_found() {
        let err = EngineError::from(RemoteError::NotFound("prod-1".to_string()));
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_remote_transport_errors_map_to_unreachable() {
        let err = EngineError::from(RemoteError::Offline);
        assert!(matches!(err, EngineError::Unreachable(_)));

        let err = EngineError::from(RemoteError::Api {
            status: 500,
            message: "internal".to_string(),
        });
        assert!(matches!(err, EngineError::Unreachable(_)));
    }
}
