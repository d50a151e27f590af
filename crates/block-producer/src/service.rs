//! Block Producer Service
//!
//! Runs one mining attempt at a time: read the tip and target, pull the best
//! mempool transactions, build coinbase and header, drive the PoW engine,
//! append, and announce the new block.

use crate::config::BlockProducerConfig;
use crate::domain::build_coinbase;
use crate::error::{BlockProductionError, Result};
use crate::metrics::Metrics;
use crate::ports::Mempool;
use chain_explorer::{ChainExplorer, ExplorerError, StoreError};
use parking_lot::Mutex;
use pow_engine::{PowEngine, PowError};
use shared_bus::{BlockAddedEvent, BlockAddedListener, BlockOrigin, BlockchainEvent, EventPublisher};
use shared_crypto::{merkle_root, HasherFactory};
use shared_types::{short_hex, Block, BlockHeader, Hash, ZERO_HASH};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// The mining attempt currently in flight.
struct ActiveAttempt {
    cancel: CancellationToken,
    parent_hash: Hash,
    /// Height of the block being mined.
    height: u64,
}

/// Single-flight guard. Holding it means this caller owns the mining slot.
struct MiningGuard<'a>(&'a AtomicBool);

impl<'a> MiningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for MiningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Publishes the attempt to block-added handling and retracts it on drop.
///
/// Dropping also cancels the attempt, so workers stop even when the
/// `mine_block` future itself is dropped.
struct AttemptGuard<'a>(&'a Mutex<Option<ActiveAttempt>>);

impl<'a> AttemptGuard<'a> {
    fn register(slot: &'a Mutex<Option<ActiveAttempt>>, attempt: ActiveAttempt) -> Self {
        *slot.lock() = Some(attempt);
        Self(slot)
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if let Some(attempt) = self.0.lock().take() {
            attempt.cancel.cancel();
        }
    }
}

/// Produces blocks on top of the explorer's chain.
pub struct BlockProducer {
    config: BlockProducerConfig,
    explorer: ChainExplorer,
    mempool: Arc<dyn Mempool>,
    engine: PowEngine,
    hashers: Arc<dyn HasherFactory>,
    events: Arc<dyn EventPublisher>,
    metrics: Metrics,

    /// Single-flight flag.
    mining: AtomicBool,
    active: Mutex<Option<ActiveAttempt>>,
    /// Root of every attempt's cancellation token.
    shutdown: CancellationToken,
}

impl BlockProducer {
    /// Create a producer. Fails on invalid configuration.
    pub fn new(
        config: BlockProducerConfig,
        explorer: ChainExplorer,
        mempool: Arc<dyn Mempool>,
        hashers: Arc<dyn HasherFactory>,
        events: Arc<dyn EventPublisher>,
    ) -> Result<Self> {
        config.validate()?;

        let engine = PowEngine::new(hashers.clone(), config.pow);
        info!(
            workers = engine.worker_count(),
            max_transactions = config.max_transactions_per_block,
            beneficiary = %hex_prefix(&config.beneficiary),
            "Initializing block producer"
        );

        Ok(Self {
            config,
            explorer,
            mempool,
            engine,
            hashers,
            events,
            metrics: Metrics::new(),
            mining: AtomicBool::new(false),
            active: Mutex::new(None),
            shutdown: CancellationToken::new(),
        })
    }

    /// Producer configuration.
    pub fn config(&self) -> &BlockProducerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// True while an attempt holds the single-flight guard.
    pub fn is_mining(&self) -> bool {
        self.mining.load(Ordering::Acquire)
    }

    /// Parent hash of the attempt currently registered for cancellation.
    pub fn active_parent(&self) -> Option<Hash> {
        self.active.lock().as_ref().map(|a| a.parent_hash)
    }

    /// Cancel the in-flight attempt and refuse every later one.
    pub fn shutdown(&self) {
        info!("Block producer shutting down");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Mine, append and announce one block on the current tip.
    ///
    /// Exhausting the nonce space refreshes the header timestamp and searches
    /// again with the same transactions. Cancellation (a new tip observed or
    /// shutdown) ends the attempt with `MiningCancelled`.
    #[instrument(skip(self))]
    pub async fn mine_block(&self) -> Result<Block> {
        let _mining =
            MiningGuard::acquire(&self.mining).ok_or(BlockProductionError::AlreadyMining)?;
        if self.shutdown.is_cancelled() {
            self.metrics.record_cancelled();
            return Err(BlockProductionError::MiningCancelled);
        }

        let (height, parent_hash) = self.chain_position()?;
        let cancel = self.shutdown.child_token();
        let attempt = AttemptGuard::register(
            &self.active,
            ActiveAttempt {
                cancel: cancel.clone(),
                parent_hash,
                height,
            },
        );
        // A tip change between reading the position and registering was not
        // seen by the block-added handler.
        if self.chain_position()?.1 != parent_hash {
            cancel.cancel();
        }

        let target = self.explorer.get_mining_target(
            height,
            self.config.adjustment_interval,
            self.config.expected_block_interval_secs,
        )?;

        let (selected, fees) = self
            .mempool
            .select(self.config.max_transactions_per_block)
            .await?;
        let reward = self.config.consensus().block_reward(height);

        let mut hasher = self.hashers.create();
        let coinbase = build_coinbase(
            &self.config.beneficiary,
            reward,
            fees,
            height,
            hasher.as_mut(),
        )?;

        let mut transactions = Vec::with_capacity(selected.len() + 1);
        transactions.push(coinbase);
        transactions.extend(selected);
        let ids: Vec<Hash> = transactions.iter().map(|tx| tx.id).collect();
        let merkle_root = merkle_root(hasher.as_mut(), &ids)?;

        let mut header = BlockHeader {
            version: self.config.block_version,
            prev_block_hash: parent_hash,
            merkle_root,
            height,
            timestamp: unix_now(),
            target,
            nonce: 0,
        };

        debug!(
            height,
            target,
            txs = transactions.len(),
            reward,
            fees,
            parent = %short_hex(&parent_hash),
            "Mining attempt started"
        );

        let started = Instant::now();
        let (hash, nonce) = loop {
            let engine = self.engine.clone();
            let template = header.clone();
            let token = cancel.clone();
            let outcome = tokio::task::spawn_blocking(move || engine.search(&template, &token))
                .await
                .map_err(|e| BlockProductionError::InternalError(e.to_string()))?;

            match outcome {
                Ok(found) => break found,
                Err(PowError::NonceSpaceExhausted) => {
                    self.metrics.record_exhaustion();
                    header.timestamp = unix_now().max(header.timestamp + 1);
                    debug!(height, timestamp = header.timestamp, "Nonce space exhausted, retrying");
                }
                Err(PowError::Cancelled) => {
                    self.metrics.record_cancelled();
                    debug!(height, "Mining attempt cancelled");
                    return Err(BlockProductionError::MiningCancelled);
                }
                Err(e) => {
                    warn!(height, error = %e, "Nonce search failed");
                    return Err(e.into());
                }
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        header.nonce = nonce;
        let block = Block {
            header,
            transactions,
            hash,
        };

        // A tip observed after the nonce was found still makes the block stale.
        if cancel.is_cancelled() {
            self.metrics.record_cancelled();
            debug!(height, "New tip arrived before append, dropping mined block");
            return Err(BlockProductionError::MiningCancelled);
        }

        let appended = self.explorer.store().append(block.clone());
        drop(attempt);
        match appended {
            Ok(()) => {}
            Err(e @ (StoreError::NotExtendingTip { .. } | StoreError::DuplicateBlock(_))) => {
                self.metrics.record_cancelled();
                debug!(height, error = %e, "Lost race for the tip");
                return Err(BlockProductionError::MiningCancelled);
            }
            Err(e) => {
                warn!(height, error = %e, "Mined block could not be appended");
                return Err(e.into());
            }
        }

        let included: Vec<Hash> = block.transactions[1..].iter().map(|tx| tx.id).collect();
        self.mempool.remove(&included).await?;

        self.metrics
            .record_block_produced(included.len() as u64, fees);
        self.metrics.record_mining_time(elapsed_ms);

        let receivers = self
            .events
            .publish(BlockchainEvent::BlockAdded(BlockAddedEvent {
                block_hash: hash,
                height,
                prev_block_hash: parent_hash,
                origin: BlockOrigin::LocalProducer,
            }))
            .await;

        info!(
            height,
            nonce,
            hash = %short_hex(&hash),
            txs = included.len(),
            reward,
            fees,
            elapsed_ms,
            receivers,
            "Block mined"
        );
        Ok(block)
    }

    /// Height and parent hash of the next block.
    fn chain_position(&self) -> Result<(u64, Hash)> {
        match self.explorer.tip_hash() {
            Ok(tip_hash) => {
                let tip = self
                    .explorer
                    .store()
                    .get_header(&tip_hash)
                    .map_err(ExplorerError::from)?;
                Ok((tip.height + 1, tip_hash))
            }
            Err(ExplorerError::NotFound(_)) => Ok((0, ZERO_HASH)),
            Err(e) => Err(e.into()),
        }
    }
}

impl BlockAddedListener for BlockProducer {
    /// A new tip at or above the attempt's height makes it stale. Events at or
    /// below the parent's height are late deliveries and are ignored.
    fn on_block_added(&self, event: &BlockAddedEvent) {
        let active = self.active.lock();
        let Some(attempt) = active.as_ref() else {
            return;
        };
        if event.block_hash == attempt.parent_hash
            || event.height < attempt.height
            || attempt.cancel.is_cancelled()
        {
            return;
        }
        debug!(
            height = event.height,
            hash = %short_hex(&event.block_hash),
            origin = ?event.origin,
            "New tip observed, cancelling mining attempt"
        );
        attempt.cancel.cancel();
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn hex_prefix(key: &[u8]) -> String {
    key.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryMempool;
    use chain_explorer::{BlockStore, InMemoryBlockStore, TargetConfig};
    use chain_validation::HeavyValidator;
    use pow_engine::PowConfig;
    use shared_bus::{EventFilter, InMemoryEventBus};
    use shared_crypto::{meets_target, Ed25519KeyPair, Ed25519Verifier, HashAlgorithm};
    use shared_types::{Transaction, TxInput, TxOutput};
    use std::time::Duration;

    const REWARD: u64 = 50;

    struct Harness {
        producer: Arc<BlockProducer>,
        store: Arc<InMemoryBlockStore>,
        mempool: Arc<InMemoryMempool>,
        bus: Arc<InMemoryEventBus>,
        miner: Ed25519KeyPair,
    }

    fn harness_with(initial_target: u32, pow: PowConfig) -> Harness {
        let miner = Ed25519KeyPair::from_seed([0xAA; 32]);
        let target = TargetConfig {
            initial_target,
            minimum_target: 0,
            maximum_target: 248,
        };
        let config = BlockProducerConfig {
            initial_reward: REWARD,
            adjustment_interval: 1_000,
            beneficiary: miner.public_key().to_vec(),
            pow,
            target,
            ..Default::default()
        };

        let store = Arc::new(InMemoryBlockStore::new());
        let mempool = Arc::new(InMemoryMempool::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let producer = BlockProducer::new(
            config,
            ChainExplorer::new(store.clone(), target),
            mempool.clone(),
            Arc::new(HashAlgorithm::Sha256d),
            bus.clone(),
        )
        .unwrap();

        Harness {
            producer: Arc::new(producer),
            store,
            mempool,
            bus,
            miner,
        }
    }

    fn harness() -> Harness {
        harness_with(4, PowConfig::default().with_workers(2))
    }

    /// Target no hash will meet in a test's lifetime.
    fn stuck_harness() -> Harness {
        harness_with(200, PowConfig::default().with_workers(2))
    }

    async fn wait_for_attempt(producer: &BlockProducer) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while producer.active_parent().is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("attempt should register");
    }

    fn spend(owner: &Ed25519KeyPair, from: &Transaction, to: &[u8], amount: u64) -> Transaction {
        let mut tx = Transaction::new(
            vec![TxInput::new(from.id, 0, owner.public_key().to_vec())],
            vec![TxOutput::new(amount, to.to_vec())],
            HashAlgorithm::Sha256d.create().as_mut(),
        )
        .unwrap();
        tx.vin[0].script_sig = owner.sign(&tx.signable_bytes()).to_vec();
        tx
    }

    #[tokio::test]
    async fn test_mines_genesis_on_empty_chain() {
        let h = harness();
        let block = h.producer.mine_block().await.unwrap();

        assert_eq!(block.header.height, 0);
        assert_eq!(block.header.prev_block_hash, ZERO_HASH);
        assert_eq!(block.header.target, 4);
        assert!(meets_target(&block.hash, 4));
        assert_eq!(block.transactions.len(), 1);
        assert!(block.transactions[0].is_coinbase());
        assert_eq!(block.transactions[0].vout[0].amount, REWARD);
        assert_eq!(h.store.last_block_hash().unwrap(), block.hash);
        assert_eq!(h.producer.metrics().get_blocks_produced(), 1);
        assert!(!h.producer.is_mining());
    }

    #[tokio::test]
    async fn test_blocks_chain_onto_tip() {
        let h = harness();
        let genesis = h.producer.mine_block().await.unwrap();
        let next = h.producer.mine_block().await.unwrap();

        assert_eq!(next.header.height, 1);
        assert_eq!(next.header.prev_block_hash, genesis.hash);
        assert_ne!(next.transactions[0].id, genesis.transactions[0].id);
        assert_eq!(h.store.len(), 2);
    }

    #[tokio::test]
    async fn test_includes_fees_and_passes_full_validation() {
        let h = harness();
        let bob = Ed25519KeyPair::from_seed([0xBB; 32]);

        let genesis = h.producer.mine_block().await.unwrap();
        let funded = h.producer.mine_block().await.unwrap();

        // Reference chain without the block under test.
        let reference = Arc::new(InMemoryBlockStore::new());
        reference.append(genesis).unwrap();
        reference.append(funded.clone()).unwrap();
        let config = h.producer.config();
        let validator = HeavyValidator::new(
            ChainExplorer::new(reference.clone(), config.target),
            Arc::new(Ed25519Verifier),
            Arc::new(HashAlgorithm::Sha256d),
        )
        .with_consensus(config.consensus());

        let tx = spend(&h.miner, &funded.transactions[0], &bob.public_key(), REWARD - 5);
        let fee = validator.validate_tx(&tx).unwrap();
        assert_eq!(fee, 5);
        h.mempool.add(tx.clone(), fee).await.unwrap();

        let block = h.producer.mine_block().await.unwrap();
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[1].id, tx.id);
        assert_eq!(block.transactions[0].vout[0].amount, REWARD + 5);
        assert!(h.mempool.is_empty().await);

        validator.validate_block_full(&block).unwrap();

        let explorer = ChainExplorer::new(h.store.clone(), TargetConfig::default());
        assert_eq!(explorer.calculate_address_balance(&bob.public_key()).unwrap(), REWARD - 5);
    }

    #[tokio::test]
    async fn test_respects_max_transactions() {
        let mut h = harness();
        let mut config = h.producer.config().clone();
        config.max_transactions_per_block = 2;
        let target = config.target;
        h.producer = Arc::new(
            BlockProducer::new(
                config,
                ChainExplorer::new(h.store.clone(), target),
                h.mempool.clone(),
                Arc::new(HashAlgorithm::Sha256d),
                h.bus.clone(),
            )
            .unwrap(),
        );

        for (seed, fee) in [(1u8, 3u64), (2, 9), (3, 6)] {
            let tx = Transaction::new(
                vec![TxInput::new([seed; 32], 0, vec![seed])],
                vec![TxOutput::new(1, vec![seed])],
                HashAlgorithm::Sha256d.create().as_mut(),
            )
            .unwrap();
            h.mempool.add(tx, fee).await.unwrap();
        }

        let block = h.producer.mine_block().await.unwrap();
        assert_eq!(block.transactions.len(), 3);
        assert_eq!(block.transactions[0].vout[0].amount, REWARD + 9 + 6);
        assert_eq!(h.mempool.len().await, 1);
    }

    #[tokio::test]
    async fn test_publishes_block_added() {
        let h = harness();
        let mut subscription = h.bus.subscribe(EventFilter::all());

        let block = h.producer.mine_block().await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(1), subscription.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            event,
            BlockchainEvent::BlockAdded(BlockAddedEvent {
                block_hash: block.hash,
                height: 0,
                prev_block_hash: ZERO_HASH,
                origin: BlockOrigin::LocalProducer,
            })
        );
    }

    #[tokio::test]
    async fn test_second_attempt_rejected_while_mining() {
        let h = stuck_harness();
        let producer = h.producer.clone();
        let first = tokio::spawn(async move { producer.mine_block().await });
        wait_for_attempt(&h.producer).await;

        assert!(h.producer.is_mining());
        assert!(matches!(
            h.producer.mine_block().await,
            Err(BlockProductionError::AlreadyMining)
        ));

        h.producer.shutdown();
        let result = tokio::time::timeout(Duration::from_secs(5), first)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(BlockProductionError::MiningCancelled)));
        assert!(!h.producer.is_mining());
    }

    #[tokio::test]
    async fn test_foreign_block_cancels_attempt() {
        let h = stuck_harness();
        let listener = shared_bus::spawn_listener(&h.bus, h.producer.clone());

        let producer = h.producer.clone();
        let attempt = tokio::spawn(async move { producer.mine_block().await });
        wait_for_attempt(&h.producer).await;

        h.bus
            .publish(BlockchainEvent::BlockAdded(BlockAddedEvent {
                block_hash: [9; 32],
                height: 0,
                prev_block_hash: ZERO_HASH,
                origin: BlockOrigin::External,
            }))
            .await;

        let result = tokio::time::timeout(Duration::from_secs(5), attempt)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(BlockProductionError::MiningCancelled)));
        assert_eq!(h.producer.metrics().get_cancelled_attempts(), 1);
        assert!(h.producer.active_parent().is_none());
        listener.abort();
    }

    #[tokio::test]
    async fn test_own_parent_event_does_not_cancel() {
        let h = stuck_harness();
        let producer = h.producer.clone();
        let attempt = tokio::spawn(async move { producer.mine_block().await });
        wait_for_attempt(&h.producer).await;

        let parent = h.producer.active_parent().unwrap();
        h.producer.on_block_added(&BlockAddedEvent {
            block_hash: parent,
            height: 0,
            prev_block_hash: ZERO_HASH,
            origin: BlockOrigin::LocalProducer,
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!attempt.is_finished());

        h.producer.shutdown();
        let result = tokio::time::timeout(Duration::from_secs(5), attempt)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(BlockProductionError::MiningCancelled)));
    }

    #[tokio::test]
    async fn test_late_event_below_attempt_height_ignored() {
        let quick = harness();
        let genesis = quick.producer.mine_block().await.unwrap();
        let first = quick.producer.mine_block().await.unwrap();

        let h = stuck_harness();
        h.store.append(genesis.clone()).unwrap();
        h.store.append(first.clone()).unwrap();

        let producer = h.producer.clone();
        let attempt = tokio::spawn(async move { producer.mine_block().await });
        wait_for_attempt(&h.producer).await;
        assert_eq!(h.producer.active_parent(), Some(first.hash));

        // Announcements of blocks the attempt already builds on.
        for (hash, height) in [(genesis.hash, 0), ([5; 32], 1)] {
            h.producer.on_block_added(&BlockAddedEvent {
                block_hash: hash,
                height,
                prev_block_hash: ZERO_HASH,
                origin: BlockOrigin::LocalProducer,
            });
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!attempt.is_finished());

        h.producer.on_block_added(&BlockAddedEvent {
            block_hash: [6; 32],
            height: 2,
            prev_block_hash: first.hash,
            origin: BlockOrigin::External,
        });
        let result = tokio::time::timeout(Duration::from_secs(5), attempt)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(BlockProductionError::MiningCancelled)));
    }

    /// Lands a rival block at `race_height` just before the producer's own.
    struct RacingStore {
        inner: InMemoryBlockStore,
        race_height: u64,
        raced: AtomicBool,
    }

    impl RacingStore {
        fn new(race_height: u64) -> Self {
            Self {
                inner: InMemoryBlockStore::new(),
                race_height,
                raced: AtomicBool::new(false),
            }
        }
    }

    impl BlockStore for RacingStore {
        fn get_block(&self, hash: &Hash) -> std::result::Result<Block, StoreError> {
            self.inner.get_block(hash)
        }

        fn last_block_hash(&self) -> std::result::Result<Hash, StoreError> {
            self.inner.last_block_hash()
        }

        fn contains(&self, hash: &Hash) -> bool {
            self.inner.contains(hash)
        }

        fn append(&self, block: Block) -> std::result::Result<(), StoreError> {
            if block.header.height == self.race_height && !self.raced.swap(true, Ordering::SeqCst)
            {
                let mut rival = block.clone();
                rival.hash = [0xEE; 32];
                self.inner.append(rival)?;
            }
            self.inner.append(block)
        }
    }

    #[tokio::test]
    async fn test_lost_tip_race_is_cancellation() {
        let h = harness();
        let config = h.producer.config().clone();
        let store = Arc::new(RacingStore::new(1));
        let producer = BlockProducer::new(
            config.clone(),
            ChainExplorer::new(store.clone(), config.target),
            h.mempool.clone(),
            Arc::new(HashAlgorithm::Sha256d),
            h.bus.clone(),
        )
        .unwrap();

        producer.mine_block().await.unwrap();
        let result = producer.mine_block().await;
        assert!(matches!(result, Err(BlockProductionError::MiningCancelled)));
        assert!(result.unwrap_err().is_recoverable());
        assert_eq!(producer.metrics().get_cancelled_attempts(), 1);
        assert_eq!(producer.metrics().get_blocks_produced(), 1);
        assert_eq!(store.last_block_hash().unwrap(), [0xEE; 32]);
        assert!(!producer.is_mining());

        // The next attempt builds on the block that won.
        let next = producer.mine_block().await.unwrap();
        assert_eq!(next.header.height, 2);
        assert_eq!(next.header.prev_block_hash, [0xEE; 32]);
    }

    #[tokio::test]
    async fn test_exhaustion_retries_until_cancelled() {
        let h = harness_with(200, PowConfig::default().with_workers(2).with_max_nonce(8));
        let producer = h.producer.clone();
        let attempt = tokio::spawn(async move { producer.mine_block().await });

        tokio::time::timeout(Duration::from_secs(5), async {
            while h.producer.metrics().get_exhaustion_retries() < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("exhaustion should be retried");

        h.producer.shutdown();
        let result = tokio::time::timeout(Duration::from_secs(5), attempt)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(BlockProductionError::MiningCancelled)));
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_is_permanent() {
        let h = harness();
        h.producer.shutdown();
        assert!(h.producer.is_shut_down());
        assert!(matches!(
            h.producer.mine_block().await,
            Err(BlockProductionError::MiningCancelled)
        ));
        assert!(!h.producer.is_mining());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = BlockProducer::new(
            BlockProducerConfig::default(),
            ChainExplorer::new(Arc::new(InMemoryBlockStore::new()), TargetConfig::default()),
            Arc::new(InMemoryMempool::new()),
            Arc::new(HashAlgorithm::Sha256d),
            Arc::new(InMemoryEventBus::new()),
        );
        assert!(matches!(result, Err(BlockProductionError::InvalidConfig(_))));
    }
}
