//! RocksDB-backed block store.
//!
//! This implementation persists blocks and chain-manager bookkeeping in a
//! RocksDB instance with dedicated column families:
//!
//! - `"blocks"`:     maps `BlockHash` (32 bytes) -> canonical block bytes,
//! - `"meta"`:       stores the current best block under a fixed key `"head"`,
//! - `"known_good"`: one empty-valued key per known-good `BlockHash`.

use std::path::Path;

use ::rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Deserialize;

use crate::consensus::store::BlockStore;
use crate::storage::StorageError;
use crate::types::{Block, BlockHash, Hash256};

const CF_BLOCKS: &str = "blocks";
const CF_META: &str = "meta";
const CF_KNOWN_GOOD: &str = "known_good";
const HEAD_KEY: &[u8] = b"head";

/// Configuration for [`RocksDbBlockStore`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RocksDbConfig {
    /// Filesystem path to the RocksDB database directory.
    pub path: String,
    /// Whether to create the database and missing column families if they
    /// do not yet exist.
    pub create_if_missing: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "data/chain-db".to_string(),
            create_if_missing: true,
        }
    }
}

/// RocksDB-backed implementation of [`BlockStore`].
pub struct RocksDbBlockStore {
    db: DB,
}

impl RocksDbBlockStore {
    /// Opens (or creates) a RocksDB-backed block store at the given path.
    ///
    /// This sets up the `"blocks"`, `"meta"` and `"known_good"` column
    /// families. The `"default"` column family is also created to keep
    /// RocksDB happy, but it is not used.
    pub fn open(cfg: &RocksDbConfig) -> Result<Self, StorageError> {
        let path = Path::new(&cfg.path);

        let mut opts = Options::default();
        opts.create_if_missing(cfg.create_if_missing);
        opts.create_missing_column_families(cfg.create_if_missing);

        let cfs = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(CF_BLOCKS, Options::default()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
            ColumnFamilyDescriptor::new(CF_KNOWN_GOOD, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;
        tracing::debug!(path = %cfg.path, "opened rocksdb block store");

        Ok(Self { db })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or(StorageError::MissingColumnFamily(name))
    }
}

fn hash_from_key(bytes: &[u8], what: &'static str) -> Result<BlockHash, StorageError> {
    Hash256::from_slice(bytes)
        .map(BlockHash)
        .ok_or(StorageError::CorruptedMeta(what))
}

impl BlockStore for RocksDbBlockStore {
    fn put_block(&self, block: &Block) -> Result<BlockHash, StorageError> {
        let bytes = block.canonical_bytes();
        let hash = BlockHash(Hash256::compute(&bytes));
        self.db.put_cf(self.cf(CF_BLOCKS)?, hash.as_bytes(), bytes)?;
        Ok(hash)
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, StorageError> {
        let Some(bytes) = self.db.get_cf(self.cf(CF_BLOCKS)?, hash.as_bytes())? else {
            return Ok(None);
        };
        if Hash256::compute(&bytes) != hash.0 {
            return Err(StorageError::CorruptedMeta("block bytes do not match their key"));
        }
        Ok(Some(Block::from_canonical_bytes(&bytes)?))
    }

    fn has_block(&self, hash: &BlockHash) -> Result<bool, StorageError> {
        Ok(self
            .db
            .get_pinned_cf(self.cf(CF_BLOCKS)?, hash.as_bytes())?
            .is_some())
    }

    fn load_head(&self) -> Result<Option<BlockHash>, StorageError> {
        match self.db.get_cf(self.cf(CF_META)?, HEAD_KEY)? {
            None => Ok(None),
            Some(bytes) => hash_from_key(&bytes, "head hash length").map(Some),
        }
    }

    fn persist_head(&self, hash: &BlockHash) -> Result<(), StorageError> {
        self.db.put_cf(self.cf(CF_META)?, HEAD_KEY, hash.as_bytes())?;
        Ok(())
    }

    fn load_known_good(&self) -> Result<Vec<BlockHash>, StorageError> {
        self.db
            .iterator_cf(self.cf(CF_KNOWN_GOOD)?, IteratorMode::Start)
            .map(|item| {
                let (key, _) = item?;
                hash_from_key(&key, "known-good key length")
            })
            .collect()
    }

    fn persist_known_good(&self, hashes: &[BlockHash]) -> Result<(), StorageError> {
        let cf = self.cf(CF_KNOWN_GOOD)?;
        let mut batch = WriteBatch::default();
        for hash in hashes {
            batch.put_cf(cf, hash.as_bytes(), b"");
        }
        self.db.write(batch)?;
        Ok(())
    }

    fn persist_head_with_known_good(
        &self,
        head: &BlockHash,
        hashes: &[BlockHash],
    ) -> Result<(), StorageError> {
        let known_good = self.cf(CF_KNOWN_GOOD)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_META)?, HEAD_KEY, head.as_bytes());
        for hash in hashes {
            batch.put_cf(known_good, hash.as_bytes(), b"");
        }
        self.db.write(batch)?;
        Ok(())
    }
}
