//! Error types for the persisted inventory.

use std::io;

use thiserror::Error;

/// Failures raised while loading or persisting the inventory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Neither the resource's first line nor the fallback header is usable.
    #[error("inventory header is malformed and the fallback header has an empty field")]
    MissingHeader,

    /// Reading from or writing to the backing resource failed.
    #[error("inventory resource I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
