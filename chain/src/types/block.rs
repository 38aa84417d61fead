// chain/src/types/block.rs

//! Block type and hashing.
//!
//! A block links to its predecessor by content hash and carries a height
//! plus an opaque payload. Only `parent` and `height` matter to the chain
//! manager; the payload participates in hashing and nothing else.
//!
//! Serialization is done with **bincode 2** using the `serde` integration
//! (`bincode::serde::encode_to_vec`) and an explicit `standard()` config.
//! The same canonical encoding is used for hashing and for on-disk storage.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Hash256, Message};

/// Strongly-typed block hash.
///
/// This is the content hash of a [`Block`], computed as a BLAKE3-256
/// digest over the canonical bincode-2 serialization of the block. It is
/// the block's address in the store and is never stored inside the block.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockHash(pub Hash256);

impl BlockHash {
    /// Returns the raw 32 hash bytes.
    pub fn as_bytes(&self) -> &[u8; super::HASH_LEN] {
        self.0.as_bytes()
    }

    /// Parses a hex-encoded block hash.
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        Hash256::from_hex(hex_str).map(BlockHash)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Immutable chain block.
///
/// Blocks form a DAG rooted at genesis through `parent`. Several blocks may
/// share a parent (forks). The structural invariant is
/// `height == parent.height + 1`, with genesis at height 0 and no parent.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Content hash of the predecessor, `None` for the genesis block.
    pub parent: Option<BlockHash>,
    /// Distance from genesis.
    pub height: u64,
    /// Free-form nonce; lets otherwise identical siblings hash differently.
    pub nonce: u64,
    /// Root of the post-state, owned by the execution layer.
    pub state_root: Option<Hash256>,
    /// Opaque messages included in this block.
    pub messages: Vec<Message>,
}

impl Block {
    /// The empty genesis block: height 0, no parent, empty payload.
    pub fn genesis() -> Self {
        Block {
            parent: None,
            height: 0,
            nonce: 0,
            state_root: None,
            messages: Vec::new(),
        }
    }

    /// Builds an empty block extending `parent`.
    pub fn child_of(parent: &Block, nonce: u64) -> Self {
        Block {
            parent: Some(parent.compute_hash()),
            height: parent.height.saturating_add(1),
            nonce,
            state_root: None,
            messages: Vec::new(),
        }
    }

    /// Returns the canonical byte representation of this block.
    ///
    /// This uses **bincode 2** with the `standard()` configuration and
    /// the `serde` integration. Hashing and storage both go through this
    /// method to avoid format drift.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails. This is considered a programming
    /// error, because every field is plain serializable data.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Explicit config to avoid relying on any implicit defaults.
        let cfg = bincode::config::standard();
        bincode::serde::encode_to_vec(self, cfg)
            .expect("Block should always be serializable with bincode 2 + serde")
    }

    /// Decodes a block from its canonical bytes.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, bincode::error::DecodeError> {
        let cfg = bincode::config::standard();
        let (block, _): (Block, usize) = bincode::serde::decode_from_slice(bytes, cfg)?;
        Ok(block)
    }

    /// Computes the BLAKE3-256 content hash of this block.
    ///
    /// Any change to any field changes the hash. This must remain stable
    /// across nodes for the network to agree on history.
    pub fn compute_hash(&self) -> BlockHash {
        let bytes = self.canonical_bytes();
        BlockHash(Hash256::compute(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_hash_is_deterministic() {
        let block = Block {
            parent: Some(BlockHash(Hash256([1u8; super::super::HASH_LEN]))),
            height: 1,
            nonce: 7,
            state_root: Some(Hash256([2u8; super::super::HASH_LEN])),
            messages: vec![Message(b"transfer".to_vec())],
        };

        let h1 = block.compute_hash();
        let h2 = block.clone().compute_hash();

        assert_eq!(h1, h2);
    }

    #[test]
    fn payload_changes_the_hash() {
        let genesis = Block::genesis();
        let a = Block::child_of(&genesis, 0);
        let b = Block::child_of(&genesis, 1);

        assert_eq!(a.parent, b.parent);
        assert_eq!(a.height, b.height);
        assert_ne!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn child_links_to_parent_hash() {
        let genesis = Block::genesis();
        let child = Block::child_of(&genesis, 0);

        assert!(genesis.parent.is_none());
        assert_eq!(child.parent, Some(genesis.compute_hash()));
        assert_eq!(child.height, 1);
    }

    #[test]
    fn canonical_bytes_decode_back() {
        let block = Block::child_of(&Block::genesis(), 3);
        let decoded = Block::from_canonical_bytes(&block.canonical_bytes()).expect("decode");
        assert_eq!(decoded, block);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(Block::from_canonical_bytes(&[0xff, 0xff, 0xff]).is_err());
    }
}
