//! Outbound ports (driven side - SPI)

use crate::error::StoreError;
use shared_types::{Block, BlockHeader, Hash};

/// Port: append-only block persistence keyed by block hash.
///
/// Implementations must be safe for concurrent readers. Backward traversal is
/// built on `get_block`/`get_header` by
/// [`ChainCursor`](crate::domain::ChainCursor).
pub trait BlockStore: Send + Sync {
    /// Fetch a block by hash.
    fn get_block(&self, hash: &Hash) -> Result<Block, StoreError>;

    /// Fetch only the header of a block.
    fn get_header(&self, hash: &Hash) -> Result<BlockHeader, StoreError> {
        self.get_block(hash).map(|block| block.header)
    }

    /// Hash of the current tip. `NotFound` on an empty store.
    fn last_block_hash(&self) -> Result<Hash, StoreError>;

    /// The current tip block.
    fn last_block(&self) -> Result<Block, StoreError> {
        self.get_block(&self.last_block_hash()?)
    }

    /// The current tip header.
    fn last_header(&self) -> Result<BlockHeader, StoreError> {
        self.get_header(&self.last_block_hash()?)
    }

    /// True if a block with this hash is stored.
    fn contains(&self, hash: &Hash) -> bool;

    /// Append a block that extends the current tip and make it the new tip.
    fn append(&self, block: Block) -> Result<(), StoreError>;
}
