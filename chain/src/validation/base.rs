//! Base validity predicate for blocks.
//!
//! This validator enforces cheap, deterministic, block-local limits that do
//! not require access to the store:
//!
//! - maximum number of messages per block,
//! - maximum canonical encoded size of a block.

use crate::consensus::config::ConsensusConfig;
use crate::consensus::error::ValidationError;
use crate::consensus::validator::BlockValidator;
use crate::types::Block;

/// Base validity predicate for blocks.
///
/// Configured from [`ConsensusConfig`]; performs purely block-local checks
/// that are inexpensive to run on every walked ancestor.
#[derive(Clone, Debug)]
pub struct BaseValidity {
    max_block_messages: usize,
    max_block_size_bytes: usize,
}

impl BaseValidity {
    /// Constructs a new `BaseValidity` from the consensus configuration.
    pub fn new(cfg: &ConsensusConfig) -> Self {
        Self {
            max_block_messages: cfg.max_block_messages,
            max_block_size_bytes: cfg.max_block_size_bytes,
        }
    }

    fn check_message_count(&self, block: &Block) -> Result<(), ValidationError> {
        let count = block.messages.len();
        if count > self.max_block_messages {
            return Err(ValidationError::Custom(format!(
                "block has {} messages, exceeds max_block_messages={}",
                count, self.max_block_messages
            )));
        }
        Ok(())
    }

    fn check_block_size(&self, block: &Block) -> Result<(), ValidationError> {
        let size = block.canonical_bytes().len();
        if size > self.max_block_size_bytes {
            return Err(ValidationError::Custom(format!(
                "block size {} bytes exceeds max_block_size_bytes={}",
                size, self.max_block_size_bytes
            )));
        }
        Ok(())
    }
}

impl BlockValidator for BaseValidity {
    fn validate(&self, block: &Block) -> Result<(), ValidationError> {
        self.check_message_count(block)?;
        self.check_block_size(block)?;
        Ok(())
    }
}
