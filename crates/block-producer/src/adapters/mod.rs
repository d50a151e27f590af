//! Adapters for outbound ports

pub mod mempool;

pub use mempool::InMemoryMempool;
