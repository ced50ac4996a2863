//! Deterministic generators for tests
//!
//! [`BlockGen`] yields hash-linked, sealed blocks without doing any
//! proof-of-work, which is all the structural tests need. Tests that
//! exercise the proof-of-work path mine for real at a low difficulty.

use crate::core::block::{Block, BlockData};
use crate::core::hash::Hash;
use crate::core::transaction::{Address, Amount, Transaction};

pub fn tx(sender: &str, recipient: &str, amount: Amount) -> Transaction {
    Transaction::new(Address::new(sender), Address::new(recipient), amount)
}

/// Infinite iterator of chained blocks. With `valid == false` every
/// block points at a bogus predecessor instead of the real tip.
pub struct BlockGen {
    valid: bool,
    tx_per_block: usize,
    index: u64,
    prev_hash: Hash,
}

impl Default for BlockGen {
    fn default() -> BlockGen {
        BlockGen {
            valid: true,
            tx_per_block: 1,
            index: 0,
            prev_hash: Hash::zero(),
        }
    }
}

impl BlockGen {
    pub fn new(valid: bool, tx_per_block: usize) -> BlockGen {
        BlockGen {
            valid,
            tx_per_block,
            ..BlockGen::default()
        }
    }
}

impl Iterator for BlockGen {
    type Item = Block;

    fn next(&mut self) -> Option<Self::Item> {
        let name = format!("block-{}", self.index);
        let prev_hash = if self.valid {
            self.prev_hash.clone()
        } else {
            Hash::new(name.as_bytes())
        };

        let transactions = (0..self.tx_per_block)
            .map(|i| {
                tx(
                    &format!("sender-{}-{}", self.index, i),
                    &format!("recipient-{}-{}", self.index, i),
                    1 + self.index + i as u64,
                )
            })
            .collect();

        let block = Block::seal(BlockData::new_with_timestamp(
            self.index,
            prev_hash,
            transactions,
            self.index,
        ));
        self.index += 1;
        self.prev_hash = block.hash().clone();
        Some(block)
    }
}
