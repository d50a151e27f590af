//! Metrics collection for block production

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for block production
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total blocks produced
    pub blocks_produced: AtomicU64,

    /// Total non-coinbase transactions included
    pub transactions_included: AtomicU64,

    /// Total fees collected
    pub total_fees_collected: AtomicU64,

    /// Total PoW mining time (milliseconds)
    pub mining_time_ms: AtomicU64,

    /// Searches that exhausted the nonce space and were retried
    pub exhaustion_retries: AtomicU64,

    /// Attempts that ended in cancellation
    pub cancelled_attempts: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a produced block
    pub fn record_block_produced(&self, tx_count: u64, fees: u64) {
        self.blocks_produced.fetch_add(1, Ordering::Relaxed);
        self.transactions_included
            .fetch_add(tx_count, Ordering::Relaxed);
        self.total_fees_collected.fetch_add(fees, Ordering::Relaxed);
    }

    /// Record PoW mining time
    pub fn record_mining_time(&self, duration_ms: u64) {
        self.mining_time_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
    }

    /// Record an exhausted search that will be retried
    pub fn record_exhaustion(&self) {
        self.exhaustion_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cancelled attempt
    pub fn record_cancelled(&self) {
        self.cancelled_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get blocks produced
    pub fn get_blocks_produced(&self) -> u64 {
        self.blocks_produced.load(Ordering::Relaxed)
    }

    /// Get cancelled attempts
    pub fn get_cancelled_attempts(&self) -> u64 {
        self.cancelled_attempts.load(Ordering::Relaxed)
    }

    /// Get exhaustion retries
    pub fn get_exhaustion_retries(&self) -> u64 {
        self.exhaustion_retries.load(Ordering::Relaxed)
    }

    /// Get average transactions per block
    pub fn get_avg_transactions_per_block(&self) -> f64 {
        let blocks = self.blocks_produced.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        let txs = self.transactions_included.load(Ordering::Relaxed);
        txs as f64 / blocks as f64
    }

    /// Get average mining time per block (milliseconds)
    pub fn get_avg_mining_time(&self) -> f64 {
        let blocks = self.blocks_produced.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        let time = self.mining_time_ms.load(Ordering::Relaxed);
        time as f64 / blocks as f64
    }
}
