//! Error types for block production

use chain_explorer::{ExplorerError, StoreError};
use pow_engine::PowError;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Result type alias for block production operations
pub type Result<T> = std::result::Result<T, BlockProductionError>;

/// Errors that can occur during block production
#[derive(Debug, Error)]
pub enum BlockProductionError {
    /// Another mining attempt holds the single-flight guard
    #[error("A mining attempt is already in progress")]
    AlreadyMining,

    /// The attempt was cancelled (new tip or shutdown)
    #[error("Mining cancelled")]
    MiningCancelled,

    /// Chain query failed
    #[error("Explorer error: {0}")]
    Explorer(#[from] ExplorerError),

    /// Block append failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Mempool rejected an operation
    #[error("Mempool error: {0}")]
    MempoolError(String),

    /// Hashing failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Nonce search failed for a reason other than cancellation or crypto
    #[error("PoW error: {0}")]
    Pow(PowError),

    /// Reward plus fees does not fit in an amount
    #[error("Coinbase value overflow: reward {reward} + fees {fees}")]
    RewardOverflow {
        /// Block subsidy
        reward: u64,
        /// Collected fees
        fees: u64,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<PowError> for BlockProductionError {
    fn from(err: PowError) -> Self {
        match err {
            PowError::Cancelled => Self::MiningCancelled,
            PowError::Crypto(e) => Self::Crypto(e),
            PowError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            other => Self::Pow(other),
        }
    }
}

impl BlockProductionError {
    /// Check if error is recoverable (should retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MiningCancelled | Self::AlreadyMining | Self::MempoolError(_)
        )
    }

    /// Check if error is critical (should stop production)
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::Crypto(_) | Self::Storage(_) | Self::InvalidConfig(_) | Self::InternalError(_)
        )
    }
}
