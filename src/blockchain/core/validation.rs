use crate::crypto::hash_to_hex;
use thiserror::Error;

use super::chain::Block;

/// The rule a block broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    #[error("transaction {tx_index} is invalid: {reason}")]
    InvalidTransaction { tx_index: usize, reason: String },
    #[error("stored hash {stored} does not match computed hash {computed}")]
    HashMismatch { stored: String, computed: String },
    #[error("previous hash {found} does not match predecessor hash {expected}")]
    BrokenLink { expected: String, found: String },
}

/// First failing block and the rule it broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("block {block_index}: {kind}")]
pub struct ChainViolation {
    pub block_index: usize,
    pub kind: ViolationKind,
}

/// Walks the chain from block 1, checking transactions, the cached hash and
/// the link to the predecessor, in that order. Genesis is trusted as-is.
pub fn validate_chain(blocks: &[Block]) -> Result<(), ChainViolation> {
    for (block_index, pair) in blocks.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);
        let block_index = block_index + 1;

        if let Some((tx_index, reason)) = block.first_invalid_transaction() {
            return Err(ChainViolation {
                block_index,
                kind: ViolationKind::InvalidTransaction { tx_index, reason },
            });
        }

        let computed = block.calculate_hash();
        if block.hash != computed {
            return Err(ChainViolation {
                block_index,
                kind: ViolationKind::HashMismatch {
                    stored: hash_to_hex(&block.hash),
                    computed: hash_to_hex(&computed),
                },
            });
        }

        if block.previous_hash != previous.hash {
            return Err(ChainViolation {
                block_index,
                kind: ViolationKind::BrokenLink {
                    expected: hash_to_hex(&previous.hash),
                    found: hash_to_hex(&block.previous_hash),
                },
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Address;
    use crate::transaction::RewardTx;

    fn linked_blocks(count: usize) -> Vec<Block> {
        let mut blocks = vec![Block::genesis()];
        for i in 1..count {
            let previous = blocks[i - 1].hash;
            blocks.push(Block::new(
                previous,
                vec![RewardTx::new(Address::new("m"), i as u64).into()],
            ));
        }
        blocks
    }

    #[test]
    fn test_linked_blocks_validate() {
        assert_eq!(validate_chain(&linked_blocks(4)), Ok(()));
        assert_eq!(validate_chain(&linked_blocks(1)), Ok(()));
    }

    #[test]
    fn test_reports_hash_mismatch_at_index() {
        let mut blocks = linked_blocks(4);
        blocks[2].transactions[0] = RewardTx::new(Address::new("m"), 999).into();

        let violation = validate_chain(&blocks).unwrap_err();
        assert_eq!(violation.block_index, 2);
        assert!(matches!(violation.kind, ViolationKind::HashMismatch { .. }));
    }

    #[test]
    fn test_reports_broken_link_after_rehash() {
        let mut blocks = linked_blocks(4);
        blocks[1].transactions[0] = RewardTx::new(Address::new("m"), 999).into();
        blocks[1].hash = blocks[1].calculate_hash();

        let violation = validate_chain(&blocks).unwrap_err();
        assert_eq!(violation.block_index, 2);
        assert!(matches!(violation.kind, ViolationKind::BrokenLink { .. }));
        assert!(violation.to_string().starts_with("block 2: previous hash"));
    }
}
