//! # Chain Explorer
//!
//! Read-only query layer over the append-only block store.
//!
//! ## Operations
//!
//! | Query | Walks |
//! |-------|-------|
//! | `get_header_by_height` | headers, tip to genesis |
//! | `get_mining_target` | at most two header lookups |
//! | `find_unspent_outputs` / `find_unspent_transactions` | blocks, tip to genesis (genesis skipped) |
//! | `find_amount_spendable_outputs` | same as above, stops once covered |
//! | `calculate_address_balance` | same as above |
//!
//! Ledger state is never stored. Every UTXO and balance is re-derived by
//! walking the history backward through a [`ChainCursor`].

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

/// Test utilities (ChainBuilder)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::InMemoryBlockStore;
pub use config::TargetConfig;
pub use domain::{calculate_mining_target, BlockCursor, ChainCursor, HeaderCursor};
pub use error::{ExplorerError, Result, StoreError};
pub use ports::BlockStore;
pub use service::ChainExplorer;

/// Target (leading zero bits) used below the first adjustment boundary.
pub const INITIAL_TARGET: u32 = 20;

/// Lowest target an adjustment may produce.
pub const MINIMUM_TARGET: u32 = 8;

/// Highest target an adjustment may produce.
pub const MAXIMUM_TARGET: u32 = 248;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_constants_ordered() {
        assert!(MINIMUM_TARGET <= INITIAL_TARGET);
        assert!(INITIAL_TARGET <= MAXIMUM_TARGET);
        assert!(MAXIMUM_TARGET < shared_crypto::HASH_BITS);
    }
}
