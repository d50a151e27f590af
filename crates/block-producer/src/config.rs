//! Configuration types for block production

use crate::error::{BlockProductionError, Result};
use chain_explorer::TargetConfig;
use chain_validation::ConsensusConfig;
use pow_engine::PowConfig;
use serde::Deserialize;
use shared_types::PublicKey;

/// Runtime configuration for block production
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BlockProducerConfig {
    /// Most mempool transactions pulled into one block (coinbase excluded)
    pub max_transactions_per_block: usize,

    /// Subsidy at height 0, in base units
    pub initial_reward: u64,

    /// Blocks between reward halvings
    pub halving_interval: u64,

    /// Halvings after which the subsidy is zero
    pub max_halvings: u64,

    /// Blocks between target adjustments
    pub adjustment_interval: u64,

    /// Expected seconds between blocks
    pub expected_block_interval_secs: u64,

    /// Header version written into mined blocks
    pub block_version: u32,

    /// Public key receiving coinbase outputs
    pub beneficiary: PublicKey,

    /// Nonce search settings
    pub pow: PowConfig,

    /// Target bounds
    pub target: TargetConfig,
}

impl Default for BlockProducerConfig {
    fn default() -> Self {
        Self {
            max_transactions_per_block: crate::DEFAULT_MAX_TRANSACTIONS_PER_BLOCK,
            initial_reward: crate::DEFAULT_INITIAL_REWARD,
            halving_interval: crate::DEFAULT_HALVING_INTERVAL,
            max_halvings: crate::DEFAULT_MAX_HALVINGS,
            adjustment_interval: crate::DEFAULT_ADJUSTMENT_INTERVAL,
            expected_block_interval_secs: crate::DEFAULT_BLOCK_INTERVAL_SECS,
            block_version: 1,
            beneficiary: Vec::new(),
            pow: PowConfig::default(),
            target: TargetConfig::default(),
        }
    }
}

impl BlockProducerConfig {
    /// The schedule this producer mines under, for validating others' blocks.
    pub fn consensus(&self) -> ConsensusConfig {
        ConsensusConfig {
            adjustment_interval: self.adjustment_interval,
            expected_block_interval_secs: self.expected_block_interval_secs,
            initial_reward: self.initial_reward,
            halving_interval: self.halving_interval,
            max_halvings: self.max_halvings,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.halving_interval == 0 {
            return Err(BlockProductionError::InvalidConfig(
                "halving_interval must be non-zero".into(),
            ));
        }
        if self.adjustment_interval == 0 {
            return Err(BlockProductionError::InvalidConfig(
                "adjustment_interval must be non-zero".into(),
            ));
        }
        if self.expected_block_interval_secs == 0 {
            return Err(BlockProductionError::InvalidConfig(
                "expected_block_interval_secs must be non-zero".into(),
            ));
        }
        if self.beneficiary.is_empty() {
            return Err(BlockProductionError::InvalidConfig(
                "beneficiary key is empty".into(),
            ));
        }
        self.pow.validate()?;
        self.target
            .validate()
            .map_err(|e| BlockProductionError::InvalidConfig(e.to_string()))?;
        Ok(())
    }
}
