//! Storage backends for the chain.
//!
//! This module provides concrete implementations of the
//! [`crate::consensus::store::BlockStore`] trait, including:
//!
//! - an in-memory store ([`mem::InMemoryBlockStore`]) suitable for tests,
//! - a RocksDB-backed store ([`rocksdb::RocksDbBlockStore`]) that also
//!   persists the best block and the known-good set.

pub mod mem;
pub mod rocksdb;

pub use mem::InMemoryBlockStore;
pub use self::rocksdb::{RocksDbBlockStore, RocksDbConfig};

/// Storage-level error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying RocksDB error.
    #[error("rocksdb: {0}")]
    RocksDb(#[from] ::rocksdb::Error),
    /// Required column family was not found.
    #[error("missing column family '{0}'")]
    MissingColumnFamily(&'static str),
    /// Corrupted or malformed metadata (e.g. head hash with wrong length).
    #[error("corrupted metadata: {0}")]
    CorruptedMeta(&'static str),
    /// Stored block bytes could not be decoded.
    #[error("undecodable block: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}
