use crate::traits::io::ByteIO;
use ethnum::U256;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of a block's or transaction's serialized contents.
///
/// The all-zero digest doubles as the previous-hash sentinel of the
/// genesis block.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash)]
pub struct Hash {
    value: [u8; Hash::SIZE],
}

impl Hash {
    const SIZE: usize = 32;

    pub fn new(data: &[u8]) -> Hash {
        Hash {
            value: Sha256::digest(data).into(),
        }
    }

    pub fn digest(&self) -> &[u8; Hash::SIZE] {
        &self.value
    }

    pub fn zero() -> Hash {
        Hash::default()
    }

    pub fn is_zero(&self) -> bool {
        self.value == [0; Hash::SIZE]
    }

    /// The digest interpreted as a big-endian 256-bit integer, for
    /// comparison against a proof-of-work target.
    pub fn as_u256(&self) -> U256 {
        U256::from_be_bytes(self.value)
    }
}

impl Default for Hash {
    fn default() -> Hash {
        Hash {
            value: [0; Hash::SIZE],
        }
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.value))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.value))
    }
}

impl ByteIO for Hash {}
