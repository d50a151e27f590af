//! Backward traversal over the block store.
//!
//! The cursor holds only the hash of the next item to load. Each step fetches
//! that item from the store and moves to its parent, so no block outlives the
//! iteration step that loaded it.

use crate::error::ExplorerError;
use crate::ports::BlockStore;
use shared_types::{is_empty_hash, Block, BlockHeader, Hash};

/// Anything the cursor can walk: loadable by hash and linked to a parent.
pub trait ChainItem: Sized {
    /// Load the item stored under `hash`.
    fn fetch(store: &dyn BlockStore, hash: &Hash) -> Result<Self, ExplorerError>;

    /// The parent link. Empty on genesis.
    fn prev_hash(&self) -> &Hash;
}

impl ChainItem for Block {
    fn fetch(store: &dyn BlockStore, hash: &Hash) -> Result<Self, ExplorerError> {
        Ok(store.get_block(hash)?)
    }

    fn prev_hash(&self) -> &Hash {
        &self.header.prev_block_hash
    }
}

impl ChainItem for BlockHeader {
    fn fetch(store: &dyn BlockStore, hash: &Hash) -> Result<Self, ExplorerError> {
        Ok(store.get_header(hash)?)
    }

    fn prev_hash(&self) -> &Hash {
        &self.prev_block_hash
    }
}

/// Iterator from a starting hash back to genesis.
///
/// Yields `Err` at most once (a failed load) and then stops.
pub struct ChainCursor<'a, T> {
    store: &'a dyn BlockStore,
    next: Option<Hash>,
    _item: std::marker::PhantomData<T>,
}

/// Cursor over full blocks.
pub type BlockCursor<'a> = ChainCursor<'a, Block>;

/// Cursor over headers only.
pub type HeaderCursor<'a> = ChainCursor<'a, BlockHeader>;

impl<'a, T: ChainItem> ChainCursor<'a, T> {
    /// Start at `from` (inclusive).
    pub fn new(store: &'a dyn BlockStore, from: Hash) -> Self {
        Self {
            store,
            next: Some(from),
            _item: std::marker::PhantomData,
        }
    }

    /// Start at the store's tip. An empty store gives an empty cursor.
    pub fn from_tip(store: &'a dyn BlockStore) -> Result<Self, ExplorerError> {
        match store.last_block_hash() {
            Ok(tip) => Ok(Self::new(store, tip)),
            Err(crate::error::StoreError::NotFound(_)) => Ok(Self {
                store,
                next: None,
                _item: std::marker::PhantomData,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl<T: ChainItem> Iterator for ChainCursor<'_, T> {
    type Item = Result<T, ExplorerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;
        match T::fetch(self.store, &hash) {
            Ok(item) => {
                let prev = *item.prev_hash();
                if !is_empty_hash(&prev) {
                    self.next = Some(prev);
                }
                Some(Ok(item))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryBlockStore;
    use shared_types::ZERO_HASH;

    fn chain(len: u8) -> InMemoryBlockStore {
        let store = InMemoryBlockStore::new();
        let mut prev = ZERO_HASH;
        for i in 0..len {
            let hash = [i + 1; 32];
            store
                .append(Block {
                    header: BlockHeader {
                        prev_block_hash: prev,
                        height: u64::from(i),
                        ..Default::default()
                    },
                    transactions: vec![],
                    hash,
                })
                .unwrap();
            prev = hash;
        }
        store
    }

    #[test]
    fn test_walks_tip_to_genesis() {
        let store = chain(4);
        let heights: Vec<u64> = HeaderCursor::from_tip(&store)
            .unwrap()
            .map(|h| h.unwrap().height)
            .collect();
        assert_eq!(heights, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_empty_store_yields_nothing() {
        let store = InMemoryBlockStore::new();
        assert_eq!(BlockCursor::from_tip(&store).unwrap().count(), 0);
    }

    #[test]
    fn test_start_mid_chain() {
        let store = chain(4);
        let hashes: Vec<Hash> = BlockCursor::new(&store, [2; 32])
            .map(|b| b.unwrap().hash)
            .collect();
        assert_eq!(hashes, vec![[2; 32], [1; 32]]);
    }

    #[test]
    fn test_missing_block_errors_once() {
        let store = chain(2);
        let mut cursor = BlockCursor::new(&store, [9; 32]);
        assert!(matches!(cursor.next(), Some(Err(ExplorerError::NotFound(_)))));
        assert!(cursor.next().is_none());
    }
}
