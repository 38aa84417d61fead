//! Fork-choice rules for selecting the best chain.

use super::best::BestBlock;

/// Abstraction over fork-choice rules.
///
/// Given the current best block (if any) and a fully validated candidate,
/// a fork-choice implementation decides whether the candidate should become
/// the new tip. Rules must be pure: every node evaluating the same pair
/// must reach the same answer.
pub trait ForkChoice: Send + Sync {
    /// Returns `true` if the candidate should replace the current tip.
    fn should_update_tip(&self, current: Option<&BestBlock>, candidate: &BestBlock) -> bool;
}

/// Simple "longest chain by height" fork choice.
///
/// - If there is no current tip, the candidate always becomes the tip.
/// - If the candidate's height is strictly greater than the tip's height,
///   the candidate becomes the tip.
/// - If the heights are equal or lower, the tip remains unchanged, so the
///   first block seen at a height wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct LongestChainForkChoice;

impl ForkChoice for LongestChainForkChoice {
    fn should_update_tip(&self, current: Option<&BestBlock>, candidate: &BestBlock) -> bool {
        match current {
            None => true,
            Some(tip) => candidate.height > tip.height,
        }
    }
}

/// Longest chain, with equal heights resolved by the smaller block hash.
///
/// Unlike [`LongestChainForkChoice`], the outcome does not depend on
/// arrival order: nodes that saw two competing tips in different orders
/// still converge on the same one.
#[derive(Clone, Copy, Debug, Default)]
pub struct LowestHashTieBreak;

impl ForkChoice for LowestHashTieBreak {
    fn should_update_tip(&self, current: Option<&BestBlock>, candidate: &BestBlock) -> bool {
        match current {
            None => true,
            Some(tip) => {
                candidate.height > tip.height
                    || (candidate.height == tip.height && candidate.hash < tip.hash)
            }
        }
    }
}
