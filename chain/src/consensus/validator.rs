//! Block-local validity predicates used by the chain manager.

use crate::types::Block;

use super::error::ValidationError;

/// Pluggable validity predicate for a single block.
///
/// Implementations must be deterministic and side-effect free. They see one
/// block at a time; linkage checks between a block and its parent are done
/// by the ancestry walk itself. Every block that enters the known-good set
/// has passed this predicate.
pub trait BlockValidator: Send + Sync {
    fn validate(&self, block: &Block) -> Result<(), ValidationError>;
}

/// A trivial validator that accepts every block.
///
/// Useful for tests and for isolating chain logic from payload rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllValidator;

impl BlockValidator for AcceptAllValidator {
    fn validate(&self, _block: &Block) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A validator that composes two other validators.
///
/// `CombinedValidator { first, second }` runs `first.validate` and then
/// `second.validate`, failing fast on the first error.
#[derive(Clone, Debug)]
pub struct CombinedValidator<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> CombinedValidator<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> BlockValidator for CombinedValidator<A, B>
where
    A: BlockValidator,
    B: BlockValidator,
{
    fn validate(&self, block: &Block) -> Result<(), ValidationError> {
        self.first.validate(block)?;
        self.second.validate(block)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectAll;

    impl BlockValidator for RejectAll {
        fn validate(&self, _block: &Block) -> Result<(), ValidationError> {
            Err(ValidationError::Custom("rejected".to_string()))
        }
    }

    #[test]
    fn combined_validator_fails_fast() {
        let block = Block::genesis();

        let ok = CombinedValidator::new(AcceptAllValidator, AcceptAllValidator);
        assert!(ok.validate(&block).is_ok());

        let bad = CombinedValidator::new(AcceptAllValidator, RejectAll);
        assert_eq!(
            bad.validate(&block),
            Err(ValidationError::Custom("rejected".to_string()))
        );
    }
}
