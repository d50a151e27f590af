use crate::error::StoreError;
use crate::ports::BlockStore;
use parking_lot::RwLock;
use shared_types::{is_empty_hash, short_hex, Block, Hash};
use std::collections::HashMap;
use tracing::trace;

/// In-memory block store.
///
/// A hash-keyed map plus a tip pointer behind one lock, so `append` is a
/// single atomic step for concurrent readers.
#[derive(Default)]
pub struct InMemoryBlockStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    blocks: HashMap<Hash, Block>,
    tip: Option<Hash>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks.
    pub fn len(&self) -> usize {
        self.inner.read().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().tip.is_none()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get_block(&self, hash: &Hash) -> Result<Block, StoreError> {
        self.inner
            .read()
            .blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("block {}", short_hex(hash))))
    }

    fn last_block_hash(&self) -> Result<Hash, StoreError> {
        self.inner
            .read()
            .tip
            .ok_or_else(|| StoreError::NotFound("chain tip (store is empty)".into()))
    }

    fn contains(&self, hash: &Hash) -> bool {
        self.inner.read().blocks.contains_key(hash)
    }

    fn append(&self, block: Block) -> Result<(), StoreError> {
        let mut inner = self.inner.write();

        if inner.blocks.contains_key(&block.hash) {
            return Err(StoreError::DuplicateBlock(short_hex(&block.hash)));
        }

        let parent = block.header.prev_block_hash;
        let extends_tip = match inner.tip {
            Some(tip) => tip == parent,
            None => is_empty_hash(&parent),
        };
        if !extends_tip {
            return Err(StoreError::NotExtendingTip {
                expected: inner.tip.as_ref().map_or_else(|| "none".into(), short_hex),
                got: short_hex(&parent),
            });
        }

        trace!(
            height = block.header.height,
            hash = %short_hex(&block.hash),
            "Block appended"
        );
        inner.tip = Some(block.hash);
        inner.blocks.insert(block.hash, block);
        Ok(())
    }
}
