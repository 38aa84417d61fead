//! Core domain types used by the chain manager.
//!
//! This module defines strongly-typed hashes and the opaque payload types
//! carried by blocks. The goal is to avoid "naked" byte buffers in public
//! APIs and instead use domain-specific newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Block type and canonical hashing.
pub mod block;

pub use block::{Block, BlockHash};

/// Length in bytes of all 256-bit hash types used in this module.
pub const HASH_LEN: usize = 32;

/// Strongly-typed 256-bit hash wrapper (BLAKE3-256).
///
/// This type backs every fixed-size digest in the chain (block content
/// hashes, state roots). It is always exactly [`HASH_LEN`] bytes long and
/// orders lexicographically by its bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash256(pub [u8; HASH_LEN]);

impl Hash256 {
    /// Computes a new [`Hash256`] as the BLAKE3-256 hash of `data`.
    ///
    /// The result is deterministic for a given byte slice and is suitable
    /// as a content address, but it is **not** a password hash or KDF.
    pub fn compute(data: &[u8]) -> Self {
        let h = blake3::hash(data);
        Hash256(*h.as_bytes())
    }

    /// Returns the underlying 32-byte hash as a borrowed array.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Builds a hash from a byte slice, returning `None` unless it is
    /// exactly [`HASH_LEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; HASH_LEN] = bytes.try_into().ok()?;
        Some(Hash256(arr))
    }

    /// Parses a hex-encoded 32-byte hash.
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        let bytes = hex::decode(hex_str).ok()?;
        Self::from_slice(&bytes)
    }

    /// Lower-case hex encoding of the hash.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Opaque message bytes carried in a block payload.
///
/// The chain manager never interprets messages; they only influence the
/// block's content hash. Execution belongs to the VM layer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message(pub Vec<u8>);

impl Message {
    /// Returns the raw message bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
