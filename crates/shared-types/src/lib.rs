//! # Shared Types Crate
//!
//! Chain data model shared by the explorer, validators, PoW engine and
//! block producer.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-crate ledger types are defined here.
//! - **Canonical Encoding**: ids and PoW hashes are computed over the byte
//!   assemblies in [`entities`], never over a serde format.

pub mod entities;

pub use entities::*;
