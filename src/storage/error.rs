use std::path::PathBuf;
use thiserror::Error;

use crate::error::IndexError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error in '{path}': {source}")]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Serialization { path, .. } => path,
        }
    }

    /// True when the file exists but does not hold valid JSON of the
    /// expected shape
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<StorageError> for IndexError {
    fn from(err: StorageError) -> Self {
        IndexError::PersistenceError {
            path: err.path().to_path_buf(),
            source: Box::new(err),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
