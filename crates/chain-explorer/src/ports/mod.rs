//! Ports (hexagonal architecture boundaries)

pub mod outbound;

pub use outbound::BlockStore;
