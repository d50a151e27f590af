//! Chain parameters every block must agree with.

/// Target schedule and subsidy schedule shared by producers and validators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsensusConfig {
    /// Blocks between target adjustments
    pub adjustment_interval: u64,

    /// Expected seconds between blocks
    pub expected_block_interval_secs: u64,

    /// Subsidy at height 0, in base units
    pub initial_reward: u64,

    /// Blocks between reward halvings
    pub halving_interval: u64,

    /// Halvings after which the subsidy is zero
    pub max_halvings: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            adjustment_interval: crate::DEFAULT_ADJUSTMENT_INTERVAL,
            expected_block_interval_secs: crate::DEFAULT_BLOCK_INTERVAL_SECS,
            initial_reward: crate::DEFAULT_INITIAL_REWARD,
            halving_interval: crate::DEFAULT_HALVING_INTERVAL,
            max_halvings: crate::DEFAULT_MAX_HALVINGS,
        }
    }
}

impl ConsensusConfig {
    /// Subsidy for a block at `height`.
    pub fn block_reward(&self, height: u64) -> u64 {
        crate::reward::block_reward(
            self.initial_reward,
            self.halving_interval,
            self.max_halvings,
            height,
        )
    }
}
