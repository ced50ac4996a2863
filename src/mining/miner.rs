//! Proof-of-work search
//!
//! The miner takes a building block and rewrites its nonce, starting at
//! zero and counting up, until the digest clears the difficulty target.
//! The scan is linear, so the returned block always carries the smallest
//! satisfying nonce, which makes mining deterministic for fixed inputs.
//! The search is unbounded; keeping the difficulty reachable is the
//! caller's configuration problem, not the miner's.

use crate::consensus::ConsensusRules;
use crate::core::block::{Block, BlockData};

const PROGRESS_INTERVAL: u64 = 100_000;

/// Find the smallest nonce satisfying the rules and seal the block.
/// Stamps the block with the difficulty it was mined under.
pub fn mine(mut data: BlockData, rules: &ConsensusRules) -> Block {
    data.difficulty = rules.difficulty;
    data.nonce = 0;
    loop {
        let hash = data.digest();
        if rules.validate_pow(&hash) {
            log::debug!(
                "sealed block {} after {} attempts: {}",
                data.index,
                data.nonce + 1,
                hash
            );
            return Block::seal(data);
        }
        data.nonce += 1;

        if data.nonce % PROGRESS_INTERVAL == 0 {
            log::trace!("block {}: {} nonces tried", data.index, data.nonce);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::Hash;
    use crate::core::testing::tx;

    fn template() -> BlockData {
        BlockData::new_with_timestamp(
            1,
            Hash::new(b"prev"),
            vec![tx("alice", "bob", 40)],
            1234,
        )
    }

    #[test]
    fn mined_block_satisfies_target() {
        for difficulty in 1..=2 {
            let rules = ConsensusRules::new(difficulty);
            let block = mine(template(), &rules);

            assert!(rules.validate_pow(block.hash()));
            assert!(block.is_hash_valid());
            // Leading zero hex characters, 4 bits each.
            assert!(hex::encode(block.hash().digest())
                .starts_with(&"0".repeat(difficulty as usize)));
        }
    }

    #[test]
    fn smallest_nonce_wins() {
        let rules = ConsensusRules::new(1);
        let block = mine(template(), &rules);

        // Every nonce below the winner must fail the target.
        let mut data = template();
        data.difficulty = rules.difficulty;
        for nonce in 0..block.nonce() {
            data.nonce = nonce;
            assert!(!rules.validate_pow(&data.digest()));
        }
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let rules = ConsensusRules::new(1);
        let first = mine(template(), &rules);
        let second = mine(template(), &rules);

        assert_eq!(first, second);
    }

    #[test]
    fn zero_difficulty_seals_immediately() {
        let block = mine(template(), &ConsensusRules::new(0));
        assert_eq!(block.nonce(), 0);
    }
}
