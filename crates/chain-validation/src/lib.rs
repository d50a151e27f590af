//! # Chain Validation
//!
//! Two tiers of checks for transactions and blocks.
//!
//! - [`LightValidator`]: structure only, no chain access. Cheap enough to
//!   run on every transaction entering the mempool.
//! - [`HeavyValidator`]: resolves inputs through the [`ChainExplorer`],
//!   verifies signatures, enforces value conservation and block linkage.
//!   Blocks from outside must also carry the scheduled target and may not
//!   mint more than the subsidy plus fees, both fixed by [`ConsensusConfig`].
//!
//! Every rejection is a [`ValidationError::RuleViolated`] naming the
//! [`ValidationRule`] that failed.
//!
//! [`ChainExplorer`]: chain_explorer::ChainExplorer

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod heavy;
pub mod light;
pub mod reward;

mod config;

pub use config::ConsensusConfig;
pub use error::{Result, ValidationError, ValidationRule};
pub use heavy::HeavyValidator;
pub use light::LightValidator;
pub use reward::block_reward;

/// Base units per coin
pub const COIN: u64 = 100_000_000;

/// Subsidy at height 0 (50 coins)
pub const DEFAULT_INITIAL_REWARD: u64 = 50 * COIN;

/// Blocks between reward halvings
pub const DEFAULT_HALVING_INTERVAL: u64 = 210_000;

/// Halvings after which the subsidy is zero
pub const DEFAULT_MAX_HALVINGS: u64 = 64;

/// Blocks between target adjustments
pub const DEFAULT_ADJUSTMENT_INTERVAL: u64 = 10;

/// Expected seconds between blocks
pub const DEFAULT_BLOCK_INTERVAL_SECS: u64 = 600;
