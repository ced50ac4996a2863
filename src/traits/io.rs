//! Serialization and IO plumbing
//!
//! These traits give every chain entity a uniform way of moving between
//! structs, byte buffers, JSON strings and files. Binary encoding goes
//! through bincode, human-readable encoding through serde_json.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("serialization failed")]
    SerializationFailed,
    #[error("deserialization failed")]
    DeserializationFailed,
    #[error("file operation failed: {0}")]
    FileOperationFailed(#[from] std::io::Error),
}

/// Ser/de to and from byte buffers.
pub trait ByteIO: Serialize + for<'a> Deserialize<'a> {
    fn from_bytes(bytes: &[u8]) -> Result<Self, IoError> {
        bincode::deserialize(bytes).map_err(|_| IoError::DeserializationFailed)
    }

    fn into_bytes(&self) -> Result<Vec<u8>, IoError> {
        bincode::serialize(self).map_err(|_| IoError::SerializationFailed)
    }
}

/// Writing/reading the byte encoding to and from files.
pub trait FileIO: Sized + ByteIO {
    fn from_file(path: &Path) -> Result<Self, IoError> {
        let mut file = File::open(path)?;
        Self::from_file_descriptor(&mut file)
    }

    fn from_file_descriptor(file: &mut File) -> Result<Self, IoError> {
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::from_bytes(buffer.as_slice())
    }

    fn to_file(&self, path: &Path) -> Result<usize, IoError> {
        let mut file = File::create(path)?;
        self.to_file_descriptor(&mut file)
    }

    fn to_file_descriptor(&self, file: &mut File) -> Result<usize, IoError> {
        let bytes = self.into_bytes()?;
        file.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

/// Ser/de to and from JSON strings.
pub trait JsonIO: Serialize + for<'a> Deserialize<'a> {
    fn to_json(&self) -> Result<String, IoError> {
        serde_json::to_string(self).map_err(|_| IoError::SerializationFailed)
    }

    fn from_json(string: &str) -> Result<Self, IoError> {
        serde_json::from_str(string).map_err(|_| IoError::DeserializationFailed)
    }
}
