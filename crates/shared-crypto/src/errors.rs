//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
///
/// Any of these is fatal for the operation that raised it; callers never
/// retry a hashing or verification step that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The hashing backend could not produce a digest
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,
}
