//! Chain acceptance and fork choice.
//!
//! This module provides a modular, testable chain-management layer
//! consisting of:
//!
//! - configuration parameters ([`config::ConsensusConfig`]),
//! - the consumed storage interface ([`store::BlockStore`]),
//! - block-local validity predicates ([`validator::BlockValidator`]),
//! - fork-choice rules ([`fork_choice::ForkChoice`]),
//! - the known-good memo and best-block slot,
//! - and the [`manager::ChainManager`] tying them together.

pub mod best;
pub mod config;
pub mod error;
pub mod fork_choice;
pub mod known_good;
pub mod manager;
pub mod store;
pub mod validator;

pub use best::{BestBlock, BestBlockCell};
pub use config::ConsensusConfig;
pub use error::{ChainError, ValidationError};
pub use fork_choice::{ForkChoice, LongestChainForkChoice, LowestHashTieBreak};
pub use known_good::KnownGoodSet;
pub use manager::{ChainManager, Verdict};
pub use store::BlockStore;
pub use validator::{AcceptAllValidator, BlockValidator, CombinedValidator};
