//! Validation errors. Every rejection names the rule it broke.

use chain_explorer::ExplorerError;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Consensus and structural rules enforced by the validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    /// Transaction has no inputs.
    EmptyInputs,
    /// Transaction has no outputs.
    EmptyOutputs,
    /// Two inputs of one transaction spend the same output.
    DuplicateInput,
    /// Recomputed id differs from the declared id.
    IdMismatch,
    /// An output carries a zero amount.
    ZeroAmount,
    /// Non-genesis header with an empty parent hash.
    MissingParentHash,
    /// Header with an empty Merkle root.
    EmptyMerkleRoot,
    /// Header hash lacks the required leading zero bits.
    InsufficientWork,
    /// Coinbase submitted where a regular transaction is required.
    UnexpectedCoinbase,
    /// Input references an output that is missing, spent, or locked to another key.
    UnknownInput,
    /// Input signature does not verify against the output's key.
    InvalidSignature,
    /// Outputs are worth more than inputs.
    InsufficientInputValue,
    /// Value sums overflow.
    ValueOverflow,
    /// Block does not contain exactly one coinbase.
    CoinbaseCount,
    /// Two inputs in one block spend the same output.
    DuplicateBlockInput,
    /// Block parent is not the current tip.
    ParentMismatch,
    /// Block height is not tip height + 1.
    HeightMismatch,
    /// Merkle root does not commit to the block's transactions.
    MerkleRootMismatch,
    /// Recorded block hash differs from the header hash.
    HashMismatch,
    /// Header target differs from the scheduled target for its height.
    TargetMismatch,
    /// Coinbase pays more than the subsidy plus the block's fees.
    CoinbaseValue,
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::EmptyInputs => "EmptyInputs",
            Self::EmptyOutputs => "EmptyOutputs",
            Self::DuplicateInput => "DuplicateInput",
            Self::IdMismatch => "IdMismatch",
            Self::ZeroAmount => "ZeroAmount",
            Self::MissingParentHash => "MissingParentHash",
            Self::EmptyMerkleRoot => "EmptyMerkleRoot",
            Self::InsufficientWork => "InsufficientWork",
            Self::UnexpectedCoinbase => "UnexpectedCoinbase",
            Self::UnknownInput => "UnknownInput",
            Self::InvalidSignature => "InvalidSignature",
            Self::InsufficientInputValue => "InsufficientInputValue",
            Self::ValueOverflow => "ValueOverflow",
            Self::CoinbaseCount => "CoinbaseCount",
            Self::DuplicateBlockInput => "DuplicateBlockInput",
            Self::ParentMismatch => "ParentMismatch",
            Self::HeightMismatch => "HeightMismatch",
            Self::MerkleRootMismatch => "MerkleRootMismatch",
            Self::HashMismatch => "HashMismatch",
            Self::TargetMismatch => "TargetMismatch",
            Self::CoinbaseValue => "CoinbaseValue",
        };
        f.write_str(name)
    }
}

/// Errors returned by the light and heavy validators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A named rule was violated.
    #[error("Validation failed [{rule}]: {detail}")]
    RuleViolated {
        /// The violated rule.
        rule: ValidationRule,
        /// Context for logs.
        detail: String,
    },

    /// Chain lookup failed.
    #[error("Chain query failed: {0}")]
    Explorer(#[from] ExplorerError),

    /// Hashing or signature verification itself failed.
    #[error("Crypto failure: {0}")]
    Crypto(#[from] CryptoError),
}

impl ValidationError {
    /// The violated rule, if this is a rule violation.
    pub fn rule(&self) -> Option<ValidationRule> {
        match self {
            Self::RuleViolated { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

pub(crate) fn violation(rule: ValidationRule, detail: impl Into<String>) -> ValidationError {
    ValidationError::RuleViolated {
        rule,
        detail: detail.into(),
    }
}
