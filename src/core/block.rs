//! Building and sealed blocks
//!
//! A block goes through exactly two states. [`BlockData`] is the building
//! state: an index, a timestamp, the predecessor's hash, a transaction
//! snapshot and a nonce the miner is free to rewrite. [`Block`] is the
//! sealed state: the digest has been computed once, and the contents are
//! only reachable through read-only accessors, so a sealed block cannot
//! be mutated without being torn back down into a [`BlockData`].

use crate::core::hash::Hash;
use crate::core::transaction::Transaction;
use crate::traits::io::{ByteIO, FileIO, JsonIO};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub type Nonce = u64;

/// Seconds since the Unix epoch, zero if the clock is unreadable.
pub fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A block under construction. Mutable until sealed by the miner.
///
/// `difficulty` records the proof-of-work requirement in force when the
/// block is mined, so validation can hold every block to the rules it
/// was actually sealed under even after the chain's difficulty changes.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct BlockData {
    pub index: u64,
    pub timestamp: u64,
    pub prev_hash: Hash,
    pub nonce: Nonce,
    pub difficulty: u32,
    pub transactions: Vec<Transaction>,
}

impl BlockData {
    pub fn new(index: u64, prev_hash: Hash, transactions: Vec<Transaction>) -> BlockData {
        BlockData::new_with_timestamp(index, prev_hash, transactions, unix_time())
    }

    pub fn new_with_timestamp(
        index: u64,
        prev_hash: Hash,
        transactions: Vec<Transaction>,
        timestamp: u64,
    ) -> BlockData {
        BlockData {
            index,
            timestamp,
            prev_hash,
            nonce: 0,
            difficulty: 0,
            transactions,
        }
    }

    /// Deterministic digest over every field, transaction order included.
    /// Identical contents always produce identical digests.
    pub fn digest(&self) -> Hash {
        let bytes = bincode::serialize(self).expect("block data serialization cannot fail");
        Hash::new(bytes.as_slice())
    }
}

impl ByteIO for BlockData {}

/// A sealed block. The hash is computed exactly once, when the miner
/// finds a satisfying nonce, and the fields are read-only from then on.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Block {
    hash: Hash,
    data: BlockData,
}

impl Block {
    /// Seal the building block with its current nonce. Only the miner
    /// (and genesis construction) go through here.
    pub(crate) fn seal(data: BlockData) -> Block {
        Block {
            hash: data.digest(),
            data,
        }
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn index(&self) -> u64 {
        self.data.index
    }

    pub fn timestamp(&self) -> u64 {
        self.data.timestamp
    }

    pub fn prev_hash(&self) -> &Hash {
        &self.data.prev_hash
    }

    pub fn nonce(&self) -> Nonce {
        self.data.nonce
    }

    /// Difficulty recorded at mining time.
    pub fn difficulty(&self) -> u32 {
        self.data.difficulty
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.data.transactions.as_slice()
    }

    /// Tear the block back down to its building state, discarding the
    /// seal. Re-sealing requires mining again.
    pub fn into_data(self) -> BlockData {
        self.data
    }

    /// Detects tampering: recomputes the digest and compares it with the
    /// hash stored at sealing time.
    pub fn is_hash_valid(&self) -> bool {
        self.data.digest() == self.hash
    }

    /// Link check against the block that should precede this one.
    pub fn follows(&self, prev: &Block) -> bool {
        self.data.index == prev.data.index + 1 && self.data.prev_hash == prev.hash
    }

    #[cfg(test)]
    pub(crate) fn forge(hash: Hash, data: BlockData) -> Block {
        Block { hash, data }
    }
}

impl ByteIO for Block {}
impl FileIO for Block {}
impl JsonIO for Block {}
