//! Proof-of-work rules
//!
//! Difficulty counts the leading zero hex characters a sealed block's
//! hash must carry, four bits each. The check itself is done as a
//! 256-bit integer comparison against a derived target rather than a
//! string-prefix test on the hex rendering.

use crate::core::hash::Hash;
use crate::traits::io::ByteIO;
use ethnum::U256;
use serde::{Deserialize, Serialize};

/// Bits per hex character of difficulty.
const DIFFICULTY_CHAR_BITS: u32 = 4;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConsensusRules {
    pub difficulty: u32,
}

impl Default for ConsensusRules {
    fn default() -> ConsensusRules {
        ConsensusRules { difficulty: 2 }
    }
}

impl ConsensusRules {
    pub fn new(difficulty: u32) -> ConsensusRules {
        ConsensusRules { difficulty }
    }

    /// Largest hash value that satisfies the difficulty.
    pub fn target(&self) -> U256 {
        let zero_bits = self.difficulty.saturating_mul(DIFFICULTY_CHAR_BITS);
        if zero_bits >= 256 {
            U256::ZERO
        } else {
            U256::MAX >> zero_bits
        }
    }

    /// The proof-of-work predicate: does the hash clear the target?
    pub fn validate_pow(&self, hash: &Hash) -> bool {
        hash.as_u256() <= self.target()
    }
}

impl ByteIO for ConsensusRules {}
