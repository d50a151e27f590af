//! Heavy validation: rules that need the chain and signature verification.

use crate::config::ConsensusConfig;
use crate::error::{violation, Result, ValidationRule};
use crate::light::LightValidator;
use chain_explorer::{ChainExplorer, ExplorerError};
use shared_crypto::{merkle_root, HasherFactory, SignatureVerifier};
use shared_types::{
    short_hex, Block, Hash, OutPoint, PublicKey, Transaction, Utxo, ZERO_HASH,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Chain-context validator composed of light checks, the explorer and a
/// signature verifier.
#[derive(Clone)]
pub struct HeavyValidator {
    light: LightValidator,
    explorer: ChainExplorer,
    verifier: Arc<dyn SignatureVerifier>,
    hashers: Arc<dyn HasherFactory>,
    consensus: ConsensusConfig,
}

impl HeavyValidator {
    /// Validator enforcing the default [`ConsensusConfig`].
    pub fn new(
        explorer: ChainExplorer,
        verifier: Arc<dyn SignatureVerifier>,
        hashers: Arc<dyn HasherFactory>,
    ) -> Self {
        Self {
            light: LightValidator::new(hashers.clone()),
            explorer,
            verifier,
            hashers,
            consensus: ConsensusConfig::default(),
        }
    }

    /// Enforce `consensus` instead of the defaults.
    pub fn with_consensus(mut self, consensus: ConsensusConfig) -> Self {
        self.consensus = consensus;
        self
    }

    pub fn consensus(&self) -> &ConsensusConfig {
        &self.consensus
    }

    /// The light validator used internally.
    pub fn light(&self) -> &LightValidator {
        &self.light
    }

    /// Validate a regular transaction against the current chain.
    ///
    /// Every input must reference an unspent output locked to the input's key
    /// and carry a valid signature over the transaction's signable bytes.
    /// Returns the fee (inputs minus outputs).
    #[instrument(skip_all, fields(txid = %short_hex(&tx.id)))]
    pub fn validate_tx(&self, tx: &Transaction) -> Result<u64> {
        self.light.validate_tx_light(tx)?;

        if tx.is_coinbase() {
            return Err(violation(
                ValidationRule::UnexpectedCoinbase,
                "coinbase cannot be validated as a regular transaction",
            ));
        }

        let message = tx.signable_bytes();
        let mut unspent_by_key: HashMap<&PublicKey, Vec<Utxo>> = HashMap::new();
        let mut input_total = 0u64;

        for (idx, input) in tx.vin.iter().enumerate() {
            if !unspent_by_key.contains_key(&input.pub_key) {
                let found = self.explorer.find_unspent_outputs(&input.pub_key)?;
                unspent_by_key.insert(&input.pub_key, found);
            }

            let Some(utxo) = unspent_by_key
                .get(&input.pub_key)
                .into_iter()
                .flatten()
                .find(|u| u.txid == input.txid && u.out_idx == input.vout)
            else {
                return Err(violation(
                    ValidationRule::UnknownInput,
                    format!(
                        "input {idx} references {}:{} which is not spendable by its key",
                        short_hex(&input.txid),
                        input.vout
                    ),
                ));
            };

            let valid =
                self.verifier
                    .verify(&input.script_sig, &message, &utxo.output.pub_key)?;
            if !valid {
                return Err(violation(
                    ValidationRule::InvalidSignature,
                    format!("input {idx} signature does not verify"),
                ));
            }

            input_total = input_total.checked_add(utxo.output.amount).ok_or_else(|| {
                violation(ValidationRule::ValueOverflow, "input total overflows")
            })?;
        }

        let output_total = tx
            .output_total()
            .ok_or_else(|| violation(ValidationRule::ValueOverflow, "output total overflows"))?;

        if input_total < output_total {
            return Err(violation(
                ValidationRule::InsufficientInputValue,
                format!("inputs {input_total} < outputs {output_total}"),
            ));
        }

        Ok(input_total - output_total)
    }

    /// Validate a block's composition and its linkage to the current tip.
    #[instrument(skip_all, fields(height = block.header.height, hash = %short_hex(&block.hash)))]
    pub fn validate_block(&self, block: &Block) -> Result<()> {
        let coinbases = block.coinbase_count();
        if coinbases != 1 {
            return Err(violation(
                ValidationRule::CoinbaseCount,
                format!("expected exactly one coinbase, found {coinbases}"),
            ));
        }

        let mut spent: HashSet<OutPoint> = HashSet::new();
        for tx in &block.transactions {
            for input in &tx.vin {
                if !spent.insert(input.outpoint()) {
                    return Err(violation(
                        ValidationRule::DuplicateBlockInput,
                        format!(
                            "{}:{} spent twice in block",
                            short_hex(&input.txid),
                            input.vout
                        ),
                    ));
                }
            }
        }

        let (tip_hash, expected_height) = match self.explorer.tip_header() {
            Ok(tip) => (self.explorer.tip_hash()?, tip.height + 1),
            Err(ExplorerError::NotFound(_)) => (ZERO_HASH, 0),
            Err(e) => return Err(e.into()),
        };

        if block.header.prev_block_hash != tip_hash {
            return Err(violation(
                ValidationRule::ParentMismatch,
                format!(
                    "parent {} is not tip {}",
                    short_hex(&block.header.prev_block_hash),
                    short_hex(&tip_hash)
                ),
            ));
        }
        if block.header.height != expected_height {
            return Err(violation(
                ValidationRule::HeightMismatch,
                format!(
                    "height {} but expected {expected_height}",
                    block.header.height
                ),
            ));
        }

        let ids: Vec<Hash> = block.transaction_ids();
        let mut hasher = self.hashers.create();
        let root = merkle_root(hasher.as_mut(), &ids)?;
        if root != block.header.merkle_root {
            return Err(violation(
                ValidationRule::MerkleRootMismatch,
                format!(
                    "header commits to {}, transactions give {}",
                    short_hex(&block.header.merkle_root),
                    short_hex(&root)
                ),
            ));
        }

        Ok(())
    }

    /// Everything required to accept a block from outside: header rules,
    /// recorded hash, block rules, the scheduled target, each transaction
    /// against the chain and the coinbase value.
    ///
    /// The coinbase may pay at most subsidy plus fees, or one base unit when
    /// both are zero.
    ///
    /// Transactions are checked against the chain as it is before this
    /// block, so an output created and spent inside the same block is
    /// rejected as `UnknownInput`.
    #[instrument(skip_all, fields(height = block.header.height))]
    pub fn validate_block_full(&self, block: &Block) -> Result<()> {
        self.light.validate_header(&block.header)?;

        let mut hasher = self.hashers.create();
        let hash = block.header.compute_hash(hasher.as_mut())?;
        if hash != block.hash {
            return Err(violation(
                ValidationRule::HashMismatch,
                format!(
                    "recorded {}, header gives {}",
                    short_hex(&block.hash),
                    short_hex(&hash)
                ),
            ));
        }

        self.validate_block(block)?;

        let height = block.header.height;
        let expected_target = self.explorer.get_mining_target(
            height,
            self.consensus.adjustment_interval,
            self.consensus.expected_block_interval_secs,
        )?;
        if block.header.target != expected_target {
            return Err(violation(
                ValidationRule::TargetMismatch,
                format!(
                    "target {} but height {height} requires {expected_target}",
                    block.header.target
                ),
            ));
        }

        let mut fees = 0u64;
        let mut minted = 0u64;
        for tx in &block.transactions {
            if tx.is_coinbase() {
                self.light.validate_tx_light(tx)?;
                minted = tx.output_total().ok_or_else(|| {
                    violation(ValidationRule::ValueOverflow, "coinbase total overflows")
                })?;
            } else {
                let fee = self.validate_tx(tx)?;
                fees = fees
                    .checked_add(fee)
                    .ok_or_else(|| violation(ValidationRule::ValueOverflow, "fee total overflows"))?;
            }
        }

        let reward = self.consensus.block_reward(height);
        let allowed = reward
            .checked_add(fees)
            .ok_or_else(|| violation(ValidationRule::ValueOverflow, "reward plus fees overflows"))?
            .max(1);
        if minted > allowed {
            return Err(violation(
                ValidationRule::CoinbaseValue,
                format!("coinbase pays {minted}, reward {reward} plus fees {fees} allows {allowed}"),
            ));
        }

        debug!(txs = block.transactions.len(), fees, "Block accepted");
        Ok(())
    }
}
