//! Synchronized slot for the canonical tip.

use parking_lot::Mutex;
use serde::Serialize;

use crate::types::BlockHash;

use super::fork_choice::ForkChoice;

/// The block currently treated as canonical tip, with its cached height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BestBlock {
    pub hash: BlockHash,
    pub height: u64,
}

/// Owned, mutex-guarded best-block pointer.
///
/// All replacements go through [`BestBlockCell::replace_if`], which runs
/// the fork-choice comparison and the swap in one critical section. Two
/// candidates racing with heights `h1 < h2` therefore always leave `h2`
/// installed, whatever the interleaving.
#[derive(Debug, Default)]
pub struct BestBlockCell {
    inner: Mutex<Option<BestBlock>>,
}

impl BestBlockCell {
    pub fn new(initial: Option<BestBlock>) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    /// Snapshot of the current best block.
    pub fn get(&self) -> Option<BestBlock> {
        *self.inner.lock()
    }

    /// Installs `best` unconditionally after `persist` succeeds.
    pub fn set<E>(
        &self,
        best: BestBlock,
        persist: impl FnOnce(&BestBlock) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut guard = self.inner.lock();
        persist(&best)?;
        *guard = Some(best);
        Ok(())
    }

    /// Replaces the current best block with `candidate` if `fork_choice`
    /// prefers it.
    ///
    /// `persist` runs inside the critical section before the in-memory
    /// pointer moves; if it fails nothing changes. Returns whether the
    /// candidate was installed.
    pub fn replace_if<F, E>(
        &self,
        fork_choice: &F,
        candidate: BestBlock,
        persist: impl FnOnce(&BestBlock) -> Result<(), E>,
    ) -> Result<bool, E>
    where
        F: ForkChoice + ?Sized,
    {
        let mut guard = self.inner.lock();
        if !fork_choice.should_update_tip(guard.as_ref(), &candidate) {
            return Ok(false);
        }
        persist(&candidate)?;
        *guard = Some(candidate);
        Ok(true)
    }
}
