//! Test utilities: an in-memory chain builder.
//!
//! Requires feature: `test-utils`

#![allow(clippy::expect_used)]

use crate::adapters::InMemoryBlockStore;
use crate::ports::BlockStore;
use shared_crypto::{meets_target, merkle_root, Sha256dHasher};
use shared_types::{Block, BlockHeader, Hash, Transaction, TxInput, TxOutput, ZERO_HASH};
use std::sync::Arc;

/// Coinbase amount used by [`ChainBuilder::push`].
pub const TEST_REWARD: u64 = 50;

/// Default seconds between builder blocks.
pub const BLOCK_SPACING_SECS: u64 = 600;

/// First block timestamp.
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// Builds well-formed chains on an [`InMemoryBlockStore`] with SHA-256d.
pub struct ChainBuilder {
    store: Arc<InMemoryBlockStore>,
    hasher: Sha256dHasher,
    spacing: u64,
    target: u32,
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainBuilder {
    /// Empty store, target 0, 600s spacing.
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryBlockStore::new()),
            hasher: Sha256dHasher::new(),
            spacing: BLOCK_SPACING_SECS,
            target: 0,
        }
    }

    /// Seconds between consecutive block timestamps.
    pub fn with_spacing(mut self, spacing: u64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Target written into (and mined for) subsequent blocks.
    pub fn set_target(&mut self, target: u32) {
        self.target = target;
    }

    /// The store being built.
    pub fn store(&self) -> Arc<InMemoryBlockStore> {
        self.store.clone()
    }

    /// The builder's hasher, for recomputing ids in tests.
    pub fn hasher(&mut self) -> &mut Sha256dHasher {
        &mut self.hasher
    }

    /// Coinbase paying `amount` to `to` at `height`.
    pub fn coinbase(&mut self, to: &[u8], amount: u64, height: u64) -> Transaction {
        Transaction::coinbase(to.to_vec(), amount, height, &mut self.hasher).expect("hash")
    }

    /// Unsigned transfer from `from` spending `spends` into `outputs`.
    pub fn transfer(
        &mut self,
        spends: &[(Hash, u32)],
        from: &[u8],
        outputs: &[(u64, &[u8])],
    ) -> Transaction {
        let vin = spends
            .iter()
            .map(|(txid, vout)| TxInput::new(*txid, *vout, from.to_vec()))
            .collect();
        let vout = outputs
            .iter()
            .map(|(amount, to)| TxOutput::new(*amount, to.to_vec()))
            .collect();
        Transaction::new(vin, vout, &mut self.hasher).expect("hash")
    }

    /// Next height and parent hash on top of the current tip.
    pub fn next_position(&self) -> (u64, Hash, u64) {
        match self.store.last_header() {
            Ok(tip) => (
                tip.height + 1,
                self.store.last_block_hash().expect("tip hash"),
                tip.timestamp + self.spacing,
            ),
            Err(_) => (0, ZERO_HASH, GENESIS_TIMESTAMP),
        }
    }

    /// Block on the current tip with exactly `transactions`, not appended.
    pub fn assemble(&mut self, transactions: Vec<Transaction>) -> Block {
        let (height, prev_block_hash, timestamp) = self.next_position();
        let ids: Vec<Hash> = transactions.iter().map(|tx| tx.id).collect();
        let merkle_root = merkle_root(&mut self.hasher, &ids).expect("merkle");

        let header = BlockHeader {
            version: 1,
            prev_block_hash,
            merkle_root,
            height,
            timestamp,
            target: self.target,
            nonce: 0,
        };
        self.seal(header, transactions)
    }

    /// Brute-force a nonce for `header` and wrap it into a block.
    pub fn seal(&mut self, mut header: BlockHeader, transactions: Vec<Transaction>) -> Block {
        loop {
            let hash = header.compute_hash(&mut self.hasher).expect("hash");
            if meets_target(&hash, header.target) {
                return Block {
                    header,
                    transactions,
                    hash,
                };
            }
            header.nonce += 1;
        }
    }

    /// Block on the tip with a coinbase to `miner` followed by `txs`, not appended.
    pub fn next_block(&mut self, miner: &[u8], txs: Vec<Transaction>) -> Block {
        let (height, _, _) = self.next_position();
        let mut transactions = vec![self.coinbase(miner, TEST_REWARD, height)];
        transactions.extend(txs);
        self.assemble(transactions)
    }

    /// Build and append the next block.
    pub fn push(&mut self, miner: &[u8], txs: Vec<Transaction>) -> Block {
        let block = self.next_block(miner, txs);
        self.store.append(block.clone()).expect("append");
        block
    }
}
