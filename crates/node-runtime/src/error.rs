//! Node-level error type

use crate::config::ConfigError;
use block_producer::BlockProductionError;
use chain_explorer::{ExplorerError, StoreError};
use chain_validation::ValidationError;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Result type for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors surfaced by the node facade.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Configuration could not be loaded or was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A transaction or block failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Block production failed.
    #[error(transparent)]
    Production(#[from] BlockProductionError),

    /// Chain query failed.
    #[error(transparent)]
    Explorer(#[from] ExplorerError),

    /// Block store rejected a write.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Hashing failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A pending transaction already spends one of the inputs.
    #[error("Transaction conflicts with a pending transaction")]
    MempoolConflict,

    /// The wallet key cannot cover a payment.
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        /// Spendable total found.
        available: u64,
        /// Amount plus fee.
        required: u64,
    },

    /// Payment request is malformed.
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),
}

impl NodeError {
    /// True when the caller can retry or skip the item and keep running.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Production(e) => e.is_recoverable(),
            Self::Validation(_)
            | Self::MempoolConflict
            | Self::InsufficientFunds { .. }
            | Self::InvalidPayment(_) => true,
            // Lost a race against another writer of the tip.
            Self::Storage(StoreError::NotExtendingTip { .. } | StoreError::DuplicateBlock(_)) => {
                true
            }
            _ => false,
        }
    }
}
