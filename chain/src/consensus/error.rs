use crate::storage::StorageError;
use crate::types::BlockHash;

/// Reason a block failed structural validation.
///
/// Invalidity is a property of the block's current form. It is reported
/// inside [`super::Verdict::Invalid`] and never raised as an error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `child.height != parent.height + 1` on some ancestry step.
    #[error("block {child} at height {child_height} does not extend parent at height {parent_height}")]
    HeightMismatch {
        child: BlockHash,
        child_height: u64,
        parent_height: u64,
    },

    /// A parentless block that does not sit at height 0.
    #[error("genesis block {hash} has height {height}, expected 0")]
    GenesisHeight { hash: BlockHash, height: u64 },

    /// Block is invalid according to a block-local validity predicate.
    #[error("invalid block: {0}")]
    Custom(String),
}

/// Errors surfaced by the chain manager.
///
/// Verdicts are not errors; only conditions that prevent reaching a verdict
/// end up here.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The block store failed to complete a read or write.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// An ancestor referenced by the walk is not in the store yet.
    #[error("ancestor {missing} of block {child} is not available")]
    UnknownAncestor { missing: BlockHash, child: BlockHash },

    /// The caller's deadline passed before the ancestry walk finished.
    #[error("deadline exceeded during ancestry walk")]
    DeadlineExceeded,

    /// Persisted chain state does not match the block store.
    #[error("corrupted chain state: {0}")]
    Corrupted(String),
}

impl ChainError {
    /// Returns `true` when retrying later may succeed without changing the
    /// block, e.g. once a missing ancestor has been fetched.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ChainError::UnknownAncestor { .. } | ChainError::DeadlineExceeded
        )
    }
}
