//! Chain manager: ancestry validation and fork choice.
//!
//! The chain manager wires together:
//!
//! - a [`BlockStore`] holding blocks by content hash,
//! - a [`BlockValidator`] for block-local rules,
//! - a [`ForkChoice`] rule deciding the canonical tip,
//! - the [`KnownGoodSet`] memo and the [`BestBlockCell`] it owns.
//!
//! New blocks enter through [`ChainManager::process_new_block`]. Each one is
//! stored, its ancestry is walked back to the nearest known-good block (or
//! genesis), and a fully verified block is then offered to fork choice.

use std::borrow::Cow;
use std::time::Instant;

use crate::metrics::ChainMetrics;
use crate::types::{Block, BlockHash};

use super::best::{BestBlock, BestBlockCell};
use super::error::{ChainError, ValidationError};
use super::fork_choice::{ForkChoice, LongestChainForkChoice};
use super::known_good::KnownGoodSet;
use super::store::BlockStore;
use super::validator::{AcceptAllValidator, BlockValidator};

/// Outcome of processing a block.
///
/// Verdicts are the normal successful result; conditions that prevent a
/// verdict are reported as [`ChainError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Verified and installed as the new best block.
    Accepted,
    /// Verified and stored, but the best block was kept.
    Valid,
    /// Failed structural validation; nothing was memoized.
    Invalid(ValidationError),
}

impl Verdict {
    /// Short lower-case label, used in logs and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::Valid => "valid",
            Verdict::Invalid(_) => "invalid",
        }
    }
}

/// Result of an ancestry walk that reached a verdict.
enum Walk {
    /// Every hash visited, candidate first. Empty if the candidate itself
    /// was already known-good.
    Verified(Vec<BlockHash>),
    Invalid(ValidationError),
}

/// Chain manager over a block store.
///
/// This struct is generic over:
///
/// - `S`: storage backend implementing [`BlockStore`],
/// - `V`: block validator implementing [`BlockValidator`],
/// - `F`: fork-choice rule implementing [`ForkChoice`].
///
/// All methods take `&self`; share the manager between workers with an
/// `Arc`. Every instance owns its own state.
pub struct ChainManager<S, V = AcceptAllValidator, F = LongestChainForkChoice> {
    store: S,
    validator: V,
    fork_choice: F,
    known_good: KnownGoodSet,
    best: BestBlockCell,
    metrics: Option<ChainMetrics>,
}

impl<S: BlockStore> ChainManager<S> {
    /// Manager with no block-local rules and longest-chain fork choice.
    pub fn with_store(store: S) -> Self {
        Self::new(store, AcceptAllValidator, LongestChainForkChoice)
    }
}

impl<S, V, F> ChainManager<S, V, F>
where
    S: BlockStore,
    V: BlockValidator,
    F: ForkChoice,
{
    /// Creates a manager with empty bookkeeping. Call
    /// [`set_best_block`](Self::set_best_block) before processing blocks.
    pub fn new(store: S, validator: V, fork_choice: F) -> Self {
        Self {
            store,
            validator,
            fork_choice,
            known_good: KnownGoodSet::new(),
            best: BestBlockCell::default(),
            metrics: None,
        }
    }

    /// Creates a manager and restores the known-good set and best block
    /// persisted by the store.
    ///
    /// A persisted head whose block cannot be found is reported as
    /// [`ChainError::Corrupted`].
    pub fn open(store: S, validator: V, fork_choice: F) -> Result<Self, ChainError> {
        let known_good: KnownGoodSet = store.load_known_good()?.into_iter().collect();

        let best = match store.load_head()? {
            None => None,
            Some(hash) => {
                let block = store.get_block(&hash)?.ok_or_else(|| {
                    ChainError::Corrupted(format!("head {hash} is missing from the block store"))
                })?;
                known_good.insert(hash);
                Some(BestBlock {
                    hash,
                    height: block.height,
                })
            }
        };

        tracing::info!(
            known_good = known_good.len(),
            height = best.map(|b| b.height),
            "restored chain state"
        );

        Ok(Self {
            store,
            validator,
            fork_choice,
            known_good,
            best: BestBlockCell::new(best),
            metrics: None,
        })
    }

    /// Attaches Prometheus metrics.
    pub fn with_metrics(mut self, metrics: ChainMetrics) -> Self {
        if let Some(best) = self.best.get() {
            metrics.best_height.set(clamp_height(best.height));
        }
        self.metrics = Some(metrics);
        self
    }

    /// Returns a reference to the underlying block store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the current canonical tip, if one has been installed.
    pub fn best_block(&self) -> Option<BestBlock> {
        self.best.get()
    }

    /// Returns `true` if the block's ancestry is already verified.
    pub fn is_known_good(&self, hash: &BlockHash) -> bool {
        self.known_good.contains(hash)
    }

    /// Number of known-good blocks.
    pub fn known_good_len(&self) -> usize {
        self.known_good.len()
    }

    /// Installs `block` as best and known-good without any validation.
    ///
    /// This is a trust boundary: use it only for genesis or an explicitly
    /// trusted checkpoint, never for network input. Fails only if the store
    /// does, in which case no in-memory state changes.
    pub fn set_best_block(&self, block: &Block) -> Result<BlockHash, ChainError> {
        let hash = self.store.put_block(block)?;

        let best = BestBlock {
            hash,
            height: block.height,
        };
        self.best.set(best, |b| {
            self.store.persist_head_with_known_good(&b.hash, &[b.hash])
        })?;
        self.known_good.insert(hash);

        if let Some(m) = &self.metrics {
            m.best_height.set(clamp_height(best.height));
        }
        tracing::info!(height = block.height, hash = %hash, "best block set");

        Ok(hash)
    }

    /// Stores, validates and applies fork choice to a new block.
    ///
    /// Returns [`Verdict::Accepted`] if the block became the best block,
    /// [`Verdict::Valid`] if it is verified but did not win fork choice,
    /// and [`Verdict::Invalid`] on structural failure. A missing ancestor
    /// yields [`ChainError::UnknownAncestor`], which is worth retrying once
    /// the ancestor has been fetched.
    pub fn process_new_block(&self, block: &Block) -> Result<Verdict, ChainError> {
        self.process(block, None)
    }

    /// Like [`process_new_block`](Self::process_new_block), but abandons the
    /// ancestry walk with [`ChainError::DeadlineExceeded`] once `deadline`
    /// has passed. An abandoned walk leaves the known-good set and the best
    /// block untouched.
    pub fn process_new_block_until(
        &self,
        block: &Block,
        deadline: Instant,
    ) -> Result<Verdict, ChainError> {
        self.process(block, Some(deadline))
    }

    fn process(&self, block: &Block, deadline: Option<Instant>) -> Result<Verdict, ChainError> {
        let start = Instant::now();
        let verdict = self.process_inner(block, deadline);

        if let Some(m) = &self.metrics {
            m.process_block_seconds.observe(start.elapsed().as_secs_f64());
            match &verdict {
                Ok(Verdict::Accepted) => m.blocks_accepted.inc(),
                Ok(Verdict::Valid) => m.blocks_valid.inc(),
                Ok(Verdict::Invalid(_)) => m.blocks_invalid.inc(),
                Err(ChainError::UnknownAncestor { .. }) => m.ancestry_unresolved.inc(),
                Err(_) => {}
            }
        }

        verdict
    }

    fn process_inner(&self, block: &Block, deadline: Option<Instant>) -> Result<Verdict, ChainError> {
        let hash = self.store.put_block(block)?;

        let visited = match self.walk_ancestry(hash, block, deadline)? {
            Walk::Verified(visited) => visited,
            Walk::Invalid(reason) => {
                tracing::warn!(height = block.height, hash = %hash, %reason, "rejected invalid block");
                return Ok(Verdict::Invalid(reason));
            }
        };

        if !visited.is_empty() {
            self.store.persist_known_good(&visited)?;
            let added = visited.iter().filter(|h| self.known_good.insert(**h)).count();
            if let Some(m) = &self.metrics {
                m.ancestors_walked.inc_by(added as u64);
            }
        }

        let candidate = BestBlock {
            hash,
            height: block.height,
        };
        let installed = self
            .best
            .replace_if(&self.fork_choice, candidate, |b| self.store.persist_head(&b.hash))?;

        if installed {
            if let Some(m) = &self.metrics {
                m.best_height.set(clamp_height(candidate.height));
            }
            tracing::info!(height = block.height, hash = %hash, "new best block");
            Ok(Verdict::Accepted)
        } else {
            tracing::debug!(height = block.height, hash = %hash, "block valid, best block kept");
            Ok(Verdict::Valid)
        }
    }

    /// Walks parent links from `block` until a known-good block or genesis.
    ///
    /// Iterative: only the current block is held in memory, so arbitrarily
    /// deep unverified chains cannot overflow the stack.
    fn walk_ancestry(
        &self,
        hash: BlockHash,
        block: &Block,
        deadline: Option<Instant>,
    ) -> Result<Walk, ChainError> {
        let mut visited = Vec::new();
        let mut current_hash = hash;
        let mut current: Cow<'_, Block> = Cow::Borrowed(block);

        loop {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(ChainError::DeadlineExceeded);
            }

            if self.known_good.contains(&current_hash) {
                break;
            }

            if let Err(reason) = self.validator.validate(&current) {
                return Ok(Walk::Invalid(reason));
            }

            let Some(parent_hash) = current.parent else {
                if current.height != 0 {
                    return Ok(Walk::Invalid(ValidationError::GenesisHeight {
                        hash: current_hash,
                        height: current.height,
                    }));
                }
                visited.push(current_hash);
                break;
            };

            let parent = self.store.get_block(&parent_hash)?.ok_or_else(|| {
                tracing::warn!(missing = %parent_hash, child = %current_hash, "unknown ancestor");
                ChainError::UnknownAncestor {
                    missing: parent_hash,
                    child: current_hash,
                }
            })?;

            if parent.height.checked_add(1) != Some(current.height) {
                return Ok(Walk::Invalid(ValidationError::HeightMismatch {
                    child: current_hash,
                    child_height: current.height,
                    parent_height: parent.height,
                }));
            }

            visited.push(current_hash);
            current_hash = parent_hash;
            current = Cow::Owned(parent);
        }

        tracing::debug!(candidate = %hash, walked = visited.len(), "ancestry verified");
        Ok(Walk::Verified(visited))
    }
}

/// Heights are `u64`; the Prometheus gauge is `i64`.
fn clamp_height(height: u64) -> i64 {
    i64::try_from(height).unwrap_or(i64::MAX)
}
