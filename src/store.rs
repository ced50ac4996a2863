//! Chain persistence
//!
//! [`ChainStore`] is the backup/restore seam: save the whole chain
//! state, get it back exactly. [`FileStore`] is the bincode-on-disk
//! implementation. Loading never touches live state: the caller keeps
//! its current chain unless `load` returns `Ok`, and a stored chain
//! that fails validation is refused rather than quarantined here.

use crate::chain::Chain;
use crate::traits::io::{FileIO, IoError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("stored chain failed validation")]
    Corrupt,
}

pub trait ChainStore {
    fn save(&self, chain: &Chain) -> Result<(), StoreError>;
    fn load(&self) -> Result<Chain, StoreError>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> FileStore {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ChainStore for FileStore {
    fn save(&self, chain: &Chain) -> Result<(), StoreError> {
        let bytes = chain.to_file(&self.path)?;
        log::debug!("saved chain to {} ({} bytes)", self.path.display(), bytes);
        Ok(())
    }

    fn load(&self) -> Result<Chain, StoreError> {
        let chain = Chain::from_file(&self.path)?;
        if !chain.validate() {
            return Err(StoreError::Corrupt);
        }
        log::debug!(
            "loaded chain from {} ({} blocks)",
            self.path.display(),
            chain.blocks.height()
        );
        Ok(chain)
    }
}
