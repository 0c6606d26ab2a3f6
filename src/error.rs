//! Crate error types.

use thiserror::Error;

/// Errors that can occur in the buffer pool and its collaborators.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("buffer pool is full: cannot allocate new frame")]
    BufferPoolFull,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
