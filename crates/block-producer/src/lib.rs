//! # Block Producer
//!
//! Turns the current tip plus pending transactions into a mined, appended
//! block.
//!
//! ## MineBlock Flow
//!
//! ```text
//! acquire single-flight guard
//!   → tip + target            (ChainExplorer)
//!   → best-fee transactions   (Mempool)
//!   → coinbase(reward + fees) → merkle root → header
//!   → PoW search              (PowEngine, on the blocking pool)
//!       exhausted → refresh timestamp, search again
//!       cancelled → MiningCancelled
//!   → append → drop included txs from mempool → publish BlockAdded
//! ```
//!
//! ## Cancellation
//!
//! Every attempt runs under a child of the producer's shutdown token. The
//! producer is itself a [`BlockAddedListener`](shared_bus::BlockAddedListener):
//! a new tip at or above the attempt's height cancels the attempt, since
//! whatever it finds would no longer extend the chain. Losing the race at
//! append time is reported the same way, as `MiningCancelled`.
//!
//! ## Module Structure
//!
//! - [`domain`]: coinbase construction
//! - [`ports`]: the `Mempool` port
//! - [`adapters`]: fee-ordered in-memory mempool
//! - [`service`]: `BlockProducer`

#![warn(clippy::all)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

mod config;
mod error;
mod metrics;

pub use adapters::InMemoryMempool;
pub use config::BlockProducerConfig;
pub use chain_validation::{
    block_reward, ConsensusConfig, COIN, DEFAULT_ADJUSTMENT_INTERVAL, DEFAULT_BLOCK_INTERVAL_SECS,
    DEFAULT_HALVING_INTERVAL, DEFAULT_INITIAL_REWARD, DEFAULT_MAX_HALVINGS,
};
pub use domain::build_coinbase;
pub use error::{BlockProductionError, Result};
pub use metrics::Metrics;
pub use ports::Mempool;
pub use service::BlockProducer;

/// Most mempool transactions per block
pub const DEFAULT_MAX_TRANSACTIONS_PER_BLOCK: usize = 100;
