//! # Shared Crypto - Hashing and Signature Capabilities
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256d, BLAKE3 | Block/transaction ids, PoW |
//! | `merkle` | pairwise tree | Block transaction commitment |
//! | `signatures` | Ed25519 | Input unlocking |
//!
//! Hashers are handed out through [`HasherFactory`] so that every
//! concurrent worker owns its own instance.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod merkle;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{
    blake3_hash, leading_zero_bits, meets_target, Blake3Hasher, Hash, HashAlgorithm, Hasher,
    HasherFactory, Sha256dHasher, HASH_BITS,
};
pub use merkle::{merkle_root, EMPTY_MERKLE_ROOT};
pub use signatures::{Ed25519KeyPair, Ed25519Verifier, SignatureVerifier};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
