//! # Node
//!
//! Owns one instance of every component and the event bus that connects them.
//!
//! ```text
//!                  ┌──────────────── InMemoryEventBus ────────────────┐
//!                  │   BlockAdded / BlockRejected                     │
//!                  ▼                                                  │
//!   BlockProducer (listener: cancel stale attempts) ── publish ──────┤
//!        │                                                            │
//!        ├── ChainExplorer ── BlockStore ◄── import_block ── publish ─┘
//!        └── InMemoryMempool ◄── submit_transaction (HeavyValidator)
//! ```

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use crate::wallet::{build_payment, Payment};
use block_producer::{BlockProducer, BlockProductionError, InMemoryMempool, Mempool};
use chain_explorer::{BlockStore, ChainExplorer, InMemoryBlockStore};
use chain_validation::HeavyValidator;
use shared_bus::{
    spawn_listener, BlockAddedEvent, BlockOrigin, BlockchainEvent, EventPublisher,
    InMemoryEventBus,
};
use shared_crypto::{Ed25519KeyPair, Ed25519Verifier, HasherFactory};
use shared_types::{short_hex, Block, PublicKey, Transaction};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// A single mining node.
pub struct Node {
    keypair: Ed25519KeyPair,
    store: Arc<dyn BlockStore>,
    explorer: ChainExplorer,
    bus: Arc<InMemoryEventBus>,
    mempool: Arc<InMemoryMempool>,
    validator: HeavyValidator,
    producer: Arc<BlockProducer>,
    hashers: Arc<dyn HasherFactory>,
}

impl Node {
    /// Node over a fresh in-memory block store.
    pub fn new(config: NodeConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(InMemoryBlockStore::new()))
    }

    /// Node over an existing store.
    ///
    /// Coinbase outputs always pay the node key, whatever beneficiary the
    /// producer configuration carries.
    pub fn with_store(config: NodeConfig, store: Arc<dyn BlockStore>) -> Result<Self> {
        config.validate()?;

        let keypair = match config.beneficiary_seed {
            Some(seed) => Ed25519KeyPair::from_seed(seed),
            None => {
                warn!("No beneficiary seed configured, using an ephemeral key");
                Ed25519KeyPair::generate()
            }
        };

        let hashers: Arc<dyn HasherFactory> = Arc::new(config.hash_algorithm);
        let explorer = ChainExplorer::new(store.clone(), config.producer.target);
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.event_capacity));
        let mempool = Arc::new(InMemoryMempool::new());
        let validator =
            HeavyValidator::new(explorer.clone(), Arc::new(Ed25519Verifier), hashers.clone())
                .with_consensus(config.producer.consensus());

        let mut producer_config = config.producer;
        producer_config.beneficiary = keypair.public_key().to_vec();
        let producer = Arc::new(BlockProducer::new(
            producer_config,
            explorer.clone(),
            mempool.clone(),
            hashers.clone(),
            bus.clone(),
        )?);

        info!(
            hash_algorithm = ?config.hash_algorithm,
            key = %short_hex(&keypair.public_key()),
            "Node initialized"
        );

        Ok(Self {
            keypair,
            store,
            explorer,
            bus,
            mempool,
            validator,
            producer,
            hashers,
        })
    }

    /// Attach the producer to the bus so new tips cancel stale attempts.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> JoinHandle<()> {
        debug!("Starting block-added listener");
        spawn_listener(&self.bus, self.producer.clone())
    }

    /// Mine the genesis block if the store is empty.
    pub async fn bootstrap_genesis(&self) -> Result<Option<Block>> {
        if let Some(height) = self.explorer.chain_height()? {
            info!(height, "Existing chain found");
            return Ok(None);
        }

        info!("Empty chain, mining genesis block");
        let genesis = self.producer.mine_block().await?;
        info!(hash = %short_hex(&genesis.hash), "Genesis block mined");
        Ok(Some(genesis))
    }

    /// Validate a transaction and queue it for mining. Returns its fee.
    #[instrument(skip_all, fields(txid = %short_hex(&tx.id)))]
    pub async fn submit_transaction(&self, tx: Transaction) -> Result<u64> {
        let fee = self.validator.validate_tx(&tx)?;
        if self.mempool.conflicts_with(&tx) {
            return Err(NodeError::MempoolConflict);
        }
        self.mempool.add(tx, fee).await?;
        debug!(fee, "Transaction accepted into mempool");
        Ok(fee)
    }

    /// Pay from the node key and submit the result.
    ///
    /// Outputs already spent by a pending transaction are still selected, so
    /// a second payment before the first is mined can fail with
    /// [`NodeError::MempoolConflict`].
    pub async fn pay(&self, to: PublicKey, amount: u64, fee: u64) -> Result<Transaction> {
        let payment = Payment { to, amount, fee };
        let mut hasher = self.hashers.create();
        let tx = build_payment(&self.explorer, &self.keypair, &payment, hasher.as_mut())?;
        self.submit_transaction(tx.clone()).await?;
        Ok(tx)
    }

    /// Validate and append a block produced elsewhere.
    ///
    /// The block must carry the target this node would mine at that height
    /// and pay no more than the subsidy plus fees. A rejected block is
    /// announced as `BlockRejected` and never stored. An accepted one becomes
    /// the tip, clears its transactions and anything conflicting with them
    /// from the mempool, and is announced as `BlockAdded`, which cancels any
    /// local attempt on the old tip.
    #[instrument(skip_all, fields(height = block.header.height, hash = %short_hex(&block.hash)))]
    pub async fn import_block(&self, block: Block) -> Result<()> {
        if let Err(err) = self.validator.validate_block_full(&block) {
            let reason = err
                .rule()
                .map_or_else(|| err.to_string(), |rule| rule.to_string());
            warn!(%reason, error = %err, "Rejected external block");
            self.bus
                .publish(BlockchainEvent::BlockRejected {
                    block_hash: block.hash,
                    reason,
                })
                .await;
            return Err(err.into());
        }

        let event = BlockAddedEvent {
            block_hash: block.hash,
            height: block.header.height,
            prev_block_hash: block.header.prev_block_hash,
            origin: BlockOrigin::External,
        };
        let transactions = block.transactions.clone();
        self.store.append(block)?;

        let ids: Vec<_> = transactions.iter().map(|tx| tx.id).collect();
        let removed = self.mempool.remove(&ids).await?;
        let evicted = self.mempool.evict_conflicting(&transactions);

        self.bus.publish(BlockchainEvent::BlockAdded(event)).await;
        info!(removed, evicted, "Imported external block");
        Ok(())
    }

    /// Mine blocks back to back until `max_blocks` are mined or the node
    /// shuts down. Returns the number mined.
    pub async fn run_mining(&self, max_blocks: Option<u64>) -> Result<u64> {
        let mut mined = 0u64;
        info!(?max_blocks, "Mining loop started");

        while max_blocks.map_or(true, |max| mined < max) {
            match self.producer.mine_block().await {
                Ok(block) => {
                    mined += 1;
                    debug!(height = block.header.height, mined, "Mining loop progress");
                }
                Err(BlockProductionError::MiningCancelled) if self.producer.is_shut_down() => {
                    break;
                }
                Err(e) if e.is_recoverable() => {
                    debug!(error = %e, "Mining attempt ended, starting another");
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    error!(error = %e, "Mining loop failed");
                    return Err(e.into());
                }
            }
        }

        info!(mined, "Mining loop stopped");
        Ok(mined)
    }

    /// Cancel the in-flight attempt and stop the mining loop.
    pub fn shutdown(&self) {
        self.producer.shutdown();
    }

    /// Balance of any key.
    pub fn balance_of(&self, pub_key: &[u8]) -> Result<u64> {
        Ok(self.explorer.calculate_address_balance(pub_key)?)
    }

    /// Balance of the node key.
    pub fn balance(&self) -> Result<u64> {
        self.balance_of(&self.keypair.public_key())
    }

    /// The node's public key, which receives coinbase outputs.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key().to_vec()
    }

    pub fn explorer(&self) -> &ChainExplorer {
        &self.explorer
    }

    pub fn producer(&self) -> &Arc<BlockProducer> {
        &self.producer
    }

    pub fn mempool(&self) -> &Arc<InMemoryMempool> {
        &self.mempool
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }
}
