//! Outbound ports (driven side - SPI)

use crate::error::Result;
use async_trait::async_trait;
use shared_types::{Hash, Transaction};

/// Port: pending transaction pool.
///
/// Transactions are expected to be validated (and their fee computed)
/// before they are added.
#[async_trait]
pub trait Mempool: Send + Sync {
    /// Add a validated transaction paying `fee`.
    async fn add(&self, tx: Transaction, fee: u64) -> Result<()>;

    /// Up to `max` transactions, highest fee first, with their total fee.
    async fn select(&self, max: usize) -> Result<(Vec<Transaction>, u64)>;

    /// Drop transactions included in a block. Returns how many were present.
    async fn remove(&self, ids: &[Hash]) -> Result<usize>;

    /// Number of pending transactions.
    async fn len(&self) -> usize;

    /// True when nothing is pending.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
