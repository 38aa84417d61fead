//! In-memory block store.
//!
//! This implementation is useful for unit tests, benchmarks, and small
//! devnets. It keeps all blocks in a `HashMap` keyed by `BlockHash` behind
//! a read-write lock so it can be shared between workers. Chain state
//! (head, known-good set) is not persisted.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::consensus::store::BlockStore;
use crate::storage::StorageError;
use crate::types::{Block, BlockHash};

/// In-memory implementation of [`BlockStore`].
#[derive(Debug, Default)]
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<BlockHash, Block>>,
}

impl InMemoryBlockStore {
    /// Creates a new, empty in-memory block store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// Returns `true` if no blocks are stored.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn put_block(&self, block: &Block) -> Result<BlockHash, StorageError> {
        let hash = block.compute_hash();
        self.blocks
            .write()
            .entry(hash)
            .or_insert_with(|| block.clone());
        Ok(hash)
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StorageError> {
        Ok(self.blocks.read().get(hash).cloned())
    }

    fn has_block(&self, hash: &BlockHash) -> Result<bool, StorageError> {
        Ok(self.blocks.read().contains_key(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get_block_roundtrip() {
        let store = InMemoryBlockStore::new();
        let block = Block::genesis();

        let hash = store.put_block(&block).unwrap();
        assert_eq!(hash, block.compute_hash());

        let fetched = store.get_block(&hash).unwrap().expect("block should be present");
        assert_eq!(fetched, block);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryBlockStore::new();
        let block = Block::child_of(&Block::genesis(), 3);

        let h1 = store.put_block(&block).unwrap();
        let h2 = store.put_block(&block).unwrap();

        assert_eq!(h1, h2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_block_is_none_not_error() {
        let store = InMemoryBlockStore::new();
        let hash = Block::genesis().compute_hash();

        assert!(store.is_empty());
        assert!(store.get_block(&hash).unwrap().is_none());
        assert!(!store.has_block(&hash).unwrap());
    }
}
