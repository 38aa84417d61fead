//! Block validity predicates.
//!
//! Block-local checks that every block must pass before the ancestry walk
//! accepts it. Linkage rules (parent/height) live in the chain manager.

pub mod base;

pub use base::BaseValidity;
