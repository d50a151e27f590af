//! Error types for the nonce search

use shared_crypto::CryptoError;
use thiserror::Error;

/// Result type alias for PoW operations
pub type Result<T> = std::result::Result<T, PowError>;

/// Errors that can end a nonce search
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PowError {
    /// Target cannot be satisfied by a hash of this width
    #[error("Invalid target: {target} bits, must be below {max}")]
    InvalidTarget {
        /// Requested leading zero bits
        target: u32,
        /// Hash width in bits
        max: u32,
    },

    /// Caller cancelled before any worker succeeded
    #[error("Mining cancelled")]
    Cancelled,

    /// Every worker finished its range without a satisfying hash
    #[error("Nonce space exhausted")]
    NonceSpaceExhausted,

    /// Hashing failed inside a worker
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A worker thread panicked
    #[error("PoW worker panicked")]
    WorkerPanicked,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PowError {
    /// Exhaustion is retried by the caller with a fresh header.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NonceSpaceExhausted)
    }
}
