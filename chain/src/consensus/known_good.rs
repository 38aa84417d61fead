//! Memo of blocks whose ancestry has been verified back to genesis.

use dashmap::DashSet;

use crate::types::BlockHash;

/// Insert-only set of known-good block hashes.
///
/// A hash is a member iff its block's ancestry was fully walked and
/// validated (or it was installed through the trusted bootstrap). Members
/// are never removed. Membership says nothing about the best chain: sibling
/// forks are known-good too.
///
/// Reads and inserts are safe from any number of threads; inserting the
/// same hash concurrently is harmless.
#[derive(Debug, Default)]
pub struct KnownGoodSet {
    hashes: DashSet<BlockHash>,
}

impl KnownGoodSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.hashes.contains(hash)
    }

    /// Marks a hash as validated. Returns `true` if it was not yet present.
    pub fn insert(&self, hash: BlockHash) -> bool {
        self.hashes.insert(hash)
    }

    /// Marks every hash in `hashes` as validated.
    pub fn extend<I>(&self, hashes: I)
    where
        I: IntoIterator<Item = BlockHash>,
    {
        for hash in hashes {
            self.hashes.insert(hash);
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl FromIterator<BlockHash> for KnownGoodSet {
    fn from_iter<I: IntoIterator<Item = BlockHash>>(iter: I) -> Self {
        let set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HASH_LEN, Hash256};

    fn hash(byte: u8) -> BlockHash {
        BlockHash(Hash256([byte; HASH_LEN]))
    }

    #[test]
    fn insert_is_idempotent() {
        let set = KnownGoodSet::new();
        assert!(set.insert(hash(1)));
        assert!(!set.insert(hash(1)));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&hash(1)));
        assert!(!set.contains(&hash(2)));
    }

    #[test]
    fn concurrent_inserts_of_overlapping_hashes() {
        let set = KnownGoodSet::new();

        std::thread::scope(|s| {
            for worker in 0..4u8 {
                let set = &set;
                s.spawn(move || {
                    // Every worker inserts the shared prefix plus one own hash.
                    for byte in 0..16u8 {
                        set.insert(hash(byte));
                    }
                    set.insert(hash(100 + worker));
                });
            }
        });

        assert_eq!(set.len(), 16 + 4);
    }

    #[test]
    fn collects_from_iterator() {
        let set: KnownGoodSet = [hash(1), hash(2), hash(1)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
