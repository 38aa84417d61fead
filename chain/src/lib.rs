//! Chain-manager library crate.
//!
//! This crate provides the chain-acceptance core of a node: it takes newly
//! observed blocks, verifies their ancestry against a content-addressed
//! block store, and decides whether each one becomes the canonical tip.
//!
//! - strongly-typed domain types (`types`),
//! - the chain manager, fork choice and known-good memo (`consensus`),
//! - block-local validity predicates (`validation`),
//! - storage backends (`storage`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level node configuration (`config`).
//!
//! Higher-level binaries compose these pieces with networking and block
//! production, which live outside this crate.

pub mod config;
pub mod consensus;
pub mod metrics;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export top-level configuration types.
pub use config::{ChainConfig, ConfigError, MetricsConfig};

// Re-export "core" chain-management types and traits.
pub use consensus::{
    AcceptAllValidator, BestBlock, BlockStore, BlockValidator, ChainError, ChainManager,
    CombinedValidator, ConsensusConfig, ForkChoice, KnownGoodSet, LongestChainForkChoice,
    LowestHashTieBreak, ValidationError, Verdict,
};

// Re-export storage backends.
pub use storage::{InMemoryBlockStore, RocksDbBlockStore, RocksDbConfig, StorageError};

pub use validation::BaseValidity;

// Re-export metrics registry and chain metrics.
pub use metrics::{ChainMetrics, MetricsRegistry, run_prometheus_http_server};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the default fork-choice rule (first seen wins ties).
pub type DefaultForkChoice = LongestChainForkChoice;
