//! # PoW Chain Node Runtime
//!
//! Library half of the `node-runtime` binary: configuration loading, the
//! [`Node`] facade that wires every component together, and payment
//! construction for the node's own key.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `CHAIN_*` environment overrides)
//! 2. Build the node: store, explorer, bus, mempool, validator, producer
//! 3. Attach the producer to the bus as a block-added listener
//! 4. Mine genesis if the store is empty
//! 5. Run the mining loop until Ctrl-C or `CHAIN_MAX_BLOCKS`

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod node;
pub mod wallet;

pub use config::{ConfigError, NodeConfig};
pub use error::{NodeError, Result};
pub use node::Node;
pub use wallet::{build_payment, Payment};
