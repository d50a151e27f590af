//! # PoW Engine
//!
//! Parallel, cancellable search for a nonce whose header hash starts with
//! `target` zero bits.
//!
//! ## Worker Pool
//!
//! ```text
//! [0 ────────────── max_nonce)
//!  ├─ worker 0 ─┤├─ worker 1 ─┤ ... ├─ worker N-1 ─┤
//! ```
//!
//! - `N = max(1, cores / 2)` unless pinned by [`PowConfig::workers`].
//! - Each worker owns a copy of the serialized header and rewrites only the
//!   trailing nonce bytes.
//! - A child of the caller's [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   is the single stop signal. It fires on outer cancellation or on the
//!   first success, and workers poll it between nonces.
//! - The result slot is write-once. The first reporter wins.
//!
//! Cancellation and exhaustion are distinct outcomes: the block producer
//! retries exhaustion with a refreshed timestamp and gives up on cancellation.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod engine;
pub mod error;
pub mod partition;

pub use config::PowConfig;
pub use engine::PowEngine;
pub use error::{PowError, Result};
pub use partition::partition_nonce_space;
