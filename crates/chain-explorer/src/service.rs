//! Chain Explorer Service
//!
//! Read-only queries over a [`BlockStore`]. Nothing here is cached: every
//! answer is re-derived from the stored history, so repeated calls against
//! an unchanged store return identical results.

use crate::{
    config::TargetConfig,
    domain::{scan_unspent, select_spendable, BlockCursor, HeaderCursor, UnspentScan},
    error::{ExplorerError, Result},
    ports::BlockStore,
};
use shared_types::{BlockHeader, Hash, Transaction, Utxo};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Query layer over the block store.
#[derive(Clone)]
pub struct ChainExplorer {
    store: Arc<dyn BlockStore>,
    config: TargetConfig,
}

impl ChainExplorer {
    /// Create an explorer with explicit target bounds.
    pub fn new(store: Arc<dyn BlockStore>, config: TargetConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }

    /// Target bounds in use.
    pub fn target_config(&self) -> &TargetConfig {
        &self.config
    }

    /// Blocks from tip to genesis.
    pub fn blocks(&self) -> Result<BlockCursor<'_>> {
        BlockCursor::from_tip(self.store.as_ref())
    }

    /// Headers from tip to genesis.
    pub fn headers(&self) -> Result<HeaderCursor<'_>> {
        HeaderCursor::from_tip(self.store.as_ref())
    }

    /// Current tip header. `NotFound` on an empty chain.
    pub fn tip_header(&self) -> Result<BlockHeader> {
        Ok(self.store.last_header()?)
    }

    /// Current tip hash. `NotFound` on an empty chain.
    pub fn tip_hash(&self) -> Result<Hash> {
        Ok(self.store.last_block_hash()?)
    }

    /// Height of the tip, `None` on an empty chain.
    pub fn chain_height(&self) -> Result<Option<u64>> {
        match self.tip_header() {
            Ok(header) => Ok(Some(header.height)),
            Err(ExplorerError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Walk back from the tip to the header at `height`.
    #[instrument(skip(self))]
    pub fn get_header_by_height(&self, height: u64) -> Result<BlockHeader> {
        for header in self.headers()? {
            let header = header?;
            if header.height == height {
                return Ok(header);
            }
            if header.height < height {
                break;
            }
        }
        Err(ExplorerError::NotFound(format!("header at height {height}")))
    }

    /// Target the block at `height` must satisfy.
    ///
    /// Below the first boundary this is the initial target. At each multiple
    /// of `adjustment_interval` the previous target moves by one according to
    /// how long the last interval took. Everywhere else the previous block's
    /// target carries over.
    #[instrument(skip(self))]
    pub fn get_mining_target(
        &self,
        height: u64,
        adjustment_interval: u64,
        expected_interval_secs: u64,
    ) -> Result<u32> {
        if adjustment_interval == 0 {
            return Err(ExplorerError::InvalidConfig(
                "adjustment_interval must be non-zero".into(),
            ));
        }
        if height < adjustment_interval {
            return Ok(self.config.initial_target);
        }

        let tip = self.tip_header()?;
        if height > tip.height + 1 {
            return Err(ExplorerError::TargetTooFarAhead {
                requested: height,
                tip: tip.height,
            });
        }

        let prev = if height == tip.height + 1 {
            tip
        } else {
            self.get_header_by_height(height - 1)?
        };

        if height % adjustment_interval != 0 {
            return Ok(prev.target);
        }

        let boundary = self.get_header_by_height(height - adjustment_interval)?;
        let actual = prev.timestamp.saturating_sub(boundary.timestamp);
        let expected = adjustment_interval.saturating_mul(expected_interval_secs);
        let target = self.config.calculate(prev.target, expected, actual);

        debug!(
            height,
            prev_target = prev.target,
            target,
            expected,
            actual,
            "Mining target adjusted"
        );
        Ok(target)
    }

    fn scan(&self, pub_key: &[u8]) -> Result<UnspentScan> {
        scan_unspent(self.blocks()?, pub_key)
    }

    /// Every unspent output `pub_key` can unlock, most recent first.
    #[instrument(skip_all, fields(key_len = pub_key.len()))]
    pub fn find_unspent_outputs(&self, pub_key: &[u8]) -> Result<Vec<Utxo>> {
        Ok(self.scan(pub_key)?.outputs)
    }

    /// Transactions holding at least one output `pub_key` can still spend.
    #[instrument(skip_all, fields(key_len = pub_key.len()))]
    pub fn find_unspent_transactions(&self, pub_key: &[u8]) -> Result<Vec<Transaction>> {
        Ok(self.scan(pub_key)?.transactions)
    }

    /// Select unspent outputs, most recent first, until `amount` is covered.
    ///
    /// A returned total below `amount` means insufficient funds.
    #[instrument(skip(self, pub_key))]
    pub fn find_amount_spendable_outputs(
        &self,
        pub_key: &[u8],
        amount: u64,
    ) -> Result<(u64, HashMap<Hash, Vec<u32>>)> {
        let scan = self.scan(pub_key)?;
        Ok(select_spendable(&scan.outputs, amount))
    }

    /// Sum of every unspent output `pub_key` can unlock.
    pub fn calculate_address_balance(&self, pub_key: &[u8]) -> Result<u64> {
        Ok(self
            .find_unspent_outputs(pub_key)?
            .iter()
            .fold(0u64, |acc, utxo| acc.saturating_add(utxo.output.amount)))
    }
}
