use serde::Deserialize;

/// Chain-acceptance parameters.
///
/// These are block-local limits enforced by
/// [`crate::validation::BaseValidity`] on every block that enters the
/// known-good set.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Hard limit on the number of messages per block.
    pub max_block_messages: usize,
    /// Hard limit on the canonical serialized size of a block, in bytes.
    pub max_block_size_bytes: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            max_block_messages: 10_000,
            max_block_size_bytes: 1_000_000,
        }
    }
}
