//! A list of chained blocks
//!
//! Data-wise the [blockchain](Blockchain) is just an ordered list of
//! [blocks](Block) rooted at a genesis block. It is agnostic of consensus
//! rules and balances; the only guarantee it maintains is that every
//! appended block points at the current tip. Proof-of-work and
//! transaction checks live in [`crate::chain`].

use crate::core::block::Block;
use crate::core::hash::Hash;
use crate::traits::io::{ByteIO, FileIO};
use serde::{Deserialize, Serialize};
use std::slice::Iter;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BlockchainError {
    #[error("block does not extend the current tip")]
    BrokenLink,
    #[error("blockchain has no genesis block")]
    MissingGenesis,
}

/// Non-empty by construction: [`Blockchain::new`] requires a genesis
/// block, nothing removes blocks, and deserialization rejects an empty
/// list, so `genesis()` and `tip()` always have a block to return.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(try_from = "RawBlockchain")]
pub struct Blockchain {
    list: Vec<Block>,
}

#[derive(Deserialize)]
struct RawBlockchain {
    list: Vec<Block>,
}

impl TryFrom<RawBlockchain> for Blockchain {
    type Error = BlockchainError;

    fn try_from(raw: RawBlockchain) -> Result<Blockchain, BlockchainError> {
        if raw.list.is_empty() {
            return Err(BlockchainError::MissingGenesis);
        }
        Ok(Blockchain { list: raw.list })
    }
}

impl Blockchain {
    pub fn new(genesis: Block) -> Blockchain {
        Blockchain {
            list: vec![genesis],
        }
    }

    /// Number of blocks, genesis included. Never zero.
    pub fn height(&self) -> u64 {
        self.list.len() as u64
    }

    pub fn iter(&self) -> Iter<'_, Block> {
        self.list.iter()
    }

    pub fn genesis(&self) -> &Block {
        &self.list[0]
    }

    pub fn tip(&self) -> &Block {
        &self.list[self.list.len() - 1]
    }

    pub fn get_block(&self, index: u64) -> Option<&Block> {
        self.list.get(index as usize)
    }

    /// Append a block, requiring that it links to the current tip by
    /// hash and by index. Returns the height of the new block.
    pub fn append(&mut self, block: Block) -> Result<u64, BlockchainError> {
        if !block.follows(self.tip()) {
            return Err(BlockchainError::BrokenLink);
        }
        self.list.push(block);
        Ok(self.list.len() as u64 - 1)
    }

    pub fn query_block(&self, hash: &Hash) -> Option<(u64, &Block)> {
        self.list
            .iter()
            .enumerate()
            .rev()
            .find(|(_, block)| block.hash() == hash)
            .map(|(i, block)| (i as u64, block))
    }

    #[cfg(test)]
    pub(crate) fn replace_block(&mut self, index: usize, block: Block) {
        self.list[index] = block;
    }

    /// Total transaction count across all blocks.
    pub fn transaction_count(&self) -> u64 {
        self.list
            .iter()
            .map(|block| block.transactions().len() as u64)
            .sum()
    }
}

impl ByteIO for Blockchain {}
impl FileIO for Blockchain {}
