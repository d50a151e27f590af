//! # In-Memory Mempool
//!
//! Fee-ordered pending pool.
//!
//! - `by_id`: O(1) lookup by transaction id
//! - `by_fee`: O(log n) priority queue (BTreeSet), highest fee first,
//!   insertion order among equal fees

use crate::error::{BlockProductionError, Result};
use crate::ports::Mempool;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{short_hex, Hash, OutPoint, Transaction};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Priority key for one pending transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
struct FeeKey {
    fee: u64,
    seq: u64,
    id: Hash,
}

impl Ord for FeeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher fee first, then earlier insertion
        other
            .fee
            .cmp(&self.fee)
            .then_with(|| self.seq.cmp(&other.seq))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for FeeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct Pool {
    by_id: HashMap<Hash, (Transaction, FeeKey)>,
    by_fee: BTreeSet<FeeKey>,
    next_seq: u64,
}

/// Mempool held entirely in memory.
#[derive(Default)]
pub struct InMemoryMempool {
    pool: Mutex<Pool>,
}

impl InMemoryMempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `id` is pending.
    pub fn contains(&self, id: &Hash) -> bool {
        self.pool.lock().by_id.contains_key(id)
    }

    /// True if a pending transaction already spends one of `tx`'s inputs.
    pub fn conflicts_with(&self, tx: &Transaction) -> bool {
        let wanted: HashSet<OutPoint> = tx.vin.iter().map(|i| i.outpoint()).collect();
        self.pool
            .lock()
            .by_id
            .values()
            .any(|(pending, _)| pending.vin.iter().any(|i| wanted.contains(&i.outpoint())))
    }

    /// Drop pending transactions that spend an output also spent by `confirmed`.
    ///
    /// Returns how many were evicted.
    pub fn evict_conflicting(&self, confirmed: &[Transaction]) -> usize {
        let spent: HashSet<OutPoint> = confirmed
            .iter()
            .filter(|tx| !tx.is_coinbase())
            .flat_map(|tx| tx.vin.iter().map(|i| i.outpoint()))
            .collect();

        let mut pool = self.pool.lock();
        let stale: Vec<Hash> = pool
            .by_id
            .iter()
            .filter(|(_, (pending, _))| pending.vin.iter().any(|i| spent.contains(&i.outpoint())))
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            if let Some((_, key)) = pool.by_id.remove(id) {
                pool.by_fee.remove(&key);
            }
        }
        if !stale.is_empty() {
            debug!(evicted = stale.len(), "Evicted conflicting mempool transactions");
        }
        stale.len()
    }
}

#[async_trait]
impl Mempool for InMemoryMempool {
    async fn add(&self, tx: Transaction, fee: u64) -> Result<()> {
        let mut pool = self.pool.lock();
        if pool.by_id.contains_key(&tx.id) {
            return Err(BlockProductionError::MempoolError(format!(
                "duplicate transaction {}",
                short_hex(&tx.id)
            )));
        }

        let key = FeeKey {
            fee,
            seq: pool.next_seq,
            id: tx.id,
        };
        pool.next_seq += 1;
        pool.by_fee.insert(key.clone());
        pool.by_id.insert(tx.id, (tx, key));
        Ok(())
    }

    async fn select(&self, max: usize) -> Result<(Vec<Transaction>, u64)> {
        let pool = self.pool.lock();
        let mut selected = Vec::with_capacity(max.min(pool.by_fee.len()));
        let mut total_fee = 0u64;

        for key in pool.by_fee.iter().take(max) {
            let Some((tx, _)) = pool.by_id.get(&key.id) else {
                continue;
            };
            total_fee = total_fee.checked_add(key.fee).ok_or_else(|| {
                BlockProductionError::MempoolError("selected fees overflow".into())
            })?;
            selected.push(tx.clone());
        }

        debug!(selected = selected.len(), total_fee, "Selected mempool transactions");
        Ok((selected, total_fee))
    }

    async fn remove(&self, ids: &[Hash]) -> Result<usize> {
        let mut pool = self.pool.lock();
        let mut removed = 0;
        for id in ids {
            if let Some((_, key)) = pool.by_id.remove(id) {
                pool.by_fee.remove(&key);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn len(&self) -> usize {
        self.pool.lock().by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Sha256dHasher;
    use shared_types::{TxInput, TxOutput};

    fn tx(seed: u8) -> Transaction {
        Transaction::new(
            vec![TxInput::new([seed; 32], 0, vec![seed])],
            vec![TxOutput::new(10, b"payee".to_vec())],
            &mut Sha256dHasher::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_select_orders_by_fee_then_arrival() {
        let pool = InMemoryMempool::new();
        let (a, b, c, d) = (tx(1), tx(2), tx(3), tx(4));
        pool.add(a.clone(), 5).await.unwrap();
        pool.add(b.clone(), 9).await.unwrap();
        pool.add(c.clone(), 5).await.unwrap();
        pool.add(d.clone(), 1).await.unwrap();

        let (selected, fees) = pool.select(3).await.unwrap();
        let ids: Vec<Hash> = selected.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);
        assert_eq!(fees, 19);

        // Selection does not drain the pool.
        assert_eq!(pool.len().await, 4);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let pool = InMemoryMempool::new();
        pool.add(tx(1), 5).await.unwrap();
        let err = pool.add(tx(1), 7).await.unwrap_err();
        assert!(matches!(err, BlockProductionError::MempoolError(_)));
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let pool = InMemoryMempool::new();
        let (a, b) = (tx(1), tx(2));
        pool.add(a.clone(), 5).await.unwrap();
        pool.add(b.clone(), 6).await.unwrap();

        assert_eq!(pool.remove(&[a.id, [9; 32]]).await.unwrap(), 1);
        assert!(!pool.contains(&a.id));
        assert!(pool.contains(&b.id));

        let (selected, fees) = pool.select(10).await.unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(fees, 6);
    }

    #[tokio::test]
    async fn test_conflicts_and_eviction() {
        let pool = InMemoryMempool::new();
        let a = tx(1);
        pool.add(a.clone(), 5).await.unwrap();
        pool.add(tx(2), 5).await.unwrap();

        // Same outpoint as `a`, different output.
        let double_spend = Transaction::new(
            a.vin.clone(),
            vec![TxOutput::new(3, b"other".to_vec())],
            &mut Sha256dHasher::new(),
        )
        .unwrap();
        assert!(pool.conflicts_with(&double_spend));
        assert!(!pool.conflicts_with(&tx(3)));

        assert_eq!(pool.evict_conflicting(&[double_spend]), 1);
        assert!(!pool.contains(&a.id));
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let pool = InMemoryMempool::new();
        assert!(pool.is_empty().await);
        let (selected, fees) = pool.select(100).await.unwrap();
        assert!(selected.is_empty());
        assert_eq!(fees, 0);
    }
}
