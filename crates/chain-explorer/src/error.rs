//! Error types for the block store port and the explorer.

use thiserror::Error;

/// Result type alias for explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Errors raised by a [`BlockStore`](crate::ports::BlockStore) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Requested block/header is not stored, or the store is empty.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A block with this hash is already stored.
    #[error("Block {0} already stored")]
    DuplicateBlock(String),

    /// The appended block does not extend the current tip.
    #[error("Block parent {got} does not extend tip {expected}")]
    NotExtendingTip {
        /// Current tip (hex), or "none" for an empty store.
        expected: String,
        /// The block's prev hash (hex).
        got: String,
    },

    /// Backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors raised by explorer queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    /// Requested hash/height/header does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Target requested beyond the block right after the tip.
    #[error("Target requested for height {requested} but tip is at {tip}")]
    TargetTooFarAhead {
        /// Requested height.
        requested: u64,
        /// Current tip height.
        tip: u64,
    },

    /// Invalid query argument or configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Any other store failure.
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ExplorerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            other => Self::Storage(other),
        }
    }
}

impl ExplorerError {
    /// True for the NotFound class.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_through() {
        let err: ExplorerError = StoreError::NotFound("tip".into()).into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_store_errors_wrap() {
        let err: ExplorerError = StoreError::Backend("disk".into()).into();
        assert!(matches!(err, ExplorerError::Storage(StoreError::Backend(_))));
        assert!(!err.is_not_found());
    }
}
