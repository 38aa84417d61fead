//! Storage abstraction consumed by the chain manager.

use crate::storage::StorageError;
use crate::types::{Block, BlockHash};

/// Content-addressed block storage.
///
/// Implementations can be backed by in-memory maps, RocksDB, etc. The
/// chain manager only needs put/get by content hash; a block's address is
/// always [`Block::compute_hash`]. Stores are shared between concurrent
/// workers, so every method takes `&self`.
///
/// The `*_head` and `*_known_good` hooks let a persistent backend keep the
/// manager's bookkeeping across restarts. Their defaults do nothing, which
/// is the right behaviour for purely in-memory stores.
pub trait BlockStore: Send + Sync {
    /// Persists a block and returns its content hash.
    ///
    /// Re-putting identical contents is a no-op returning the same hash.
    fn put_block(&self, block: &Block) -> Result<BlockHash, StorageError>;

    /// Fetches a block by hash. `Ok(None)` means never stored (or not yet
    /// received); `Err` is reserved for infrastructure failures.
    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StorageError>;

    /// Returns `true` if a block with this hash is stored.
    fn has_block(&self, hash: &BlockHash) -> Result<bool, StorageError> {
        Ok(self.get_block(hash)?.is_some())
    }

    /// Loads the persisted best-block hash, if any.
    fn load_head(&self) -> Result<Option<BlockHash>, StorageError> {
        Ok(None)
    }

    /// Persists the best-block hash.
    fn persist_head(&self, _hash: &BlockHash) -> Result<(), StorageError> {
        Ok(())
    }

    /// Loads every persisted known-good hash.
    fn load_known_good(&self) -> Result<Vec<BlockHash>, StorageError> {
        Ok(Vec::new())
    }

    /// Persists a batch of known-good hashes. Must be all-or-nothing.
    fn persist_known_good(&self, _hashes: &[BlockHash]) -> Result<(), StorageError> {
        Ok(())
    }

    /// Persists a new head together with known-good hashes.
    ///
    /// On failure no hash may be left persisted as known-good. The default
    /// writes the head first and the hashes second; backends with batched
    /// writes should commit both at once.
    fn persist_head_with_known_good(
        &self,
        head: &BlockHash,
        hashes: &[BlockHash],
    ) -> Result<(), StorageError> {
        self.persist_head(head)?;
        self.persist_known_good(hashes)
    }
}

impl<S: BlockStore + ?Sized> BlockStore for std::sync::Arc<S> {
    fn put_block(&self, block: &Block) -> Result<BlockHash, StorageError> {
        (**self).put_block(block)
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StorageError> {
        (**self).get_block(hash)
    }

    fn has_block(&self, hash: &BlockHash) -> Result<bool, StorageError> {
        (**self).has_block(hash)
    }

    fn load_head(&self) -> Result<Option<BlockHash>, StorageError> {
        (**self).load_head()
    }

    fn persist_head(&self, hash: &BlockHash) -> Result<(), StorageError> {
        (**self).persist_head(hash)
    }

    fn load_known_good(&self) -> Result<Vec<BlockHash>, StorageError> {
        (**self).load_known_good()
    }

    fn persist_known_good(&self, hashes: &[BlockHash]) -> Result<(), StorageError> {
        (**self).persist_known_good(hashes)
    }

    fn persist_head_with_known_good(
        &self,
        head: &BlockHash,
        hashes: &[BlockHash],
    ) -> Result<(), StorageError> {
        (**self).persist_head_with_known_good(head, hashes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Minimal dummy store; good for checking trait-object use and the
    /// default persistence hooks without caring about real blocks.
    #[derive(Default)]
    struct DummyStore;

    impl BlockStore for DummyStore {
        fn put_block(&self, block: &Block) -> Result<BlockHash, StorageError> {
            Ok(block.compute_hash())
        }

        fn get_block(&self, _hash: &BlockHash) -> Result<Option<Block>, StorageError> {
            Ok(None)
        }
    }

    #[test]
    fn block_store_trait_is_object_safe() {
        fn use_trait_object(store: &dyn BlockStore) -> bool {
            store.has_block(&Block::genesis().compute_hash()).unwrap()
        }

        assert!(!use_trait_object(&DummyStore));
    }

    #[test]
    fn default_hooks_persist_nothing() {
        let store = DummyStore;
        let hash = store.put_block(&Block::genesis()).unwrap();

        store.persist_head(&hash).unwrap();
        store.persist_known_good(&[hash]).unwrap();
        store.persist_head_with_known_good(&hash, &[hash]).unwrap();

        assert!(store.load_head().unwrap().is_none());
        assert!(store.load_known_good().unwrap().is_empty());
    }

    #[test]
    fn arc_wrapped_store_delegates() {
        let store = Arc::new(DummyStore);
        let genesis = Block::genesis();
        assert_eq!(store.put_block(&genesis).unwrap(), genesis.compute_hash());
    }
}
