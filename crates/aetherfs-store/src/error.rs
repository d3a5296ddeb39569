//! Error types for the storage collaborators.

use aetherfs_types::{Signature, Tag};

/// Errors returned by [`BlockStore`](crate::BlockStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block is not stored.
    #[error("block not found: {0}")]
    NotFound(Signature),

    /// The block is already stored.
    ///
    /// This is a dedup signal, not a failure: upload pipelines treat it as
    /// success and move on without resending, whether it surfaces at stream
    /// open, mid-stream, or at close.
    #[error("block already exists: {0}")]
    AlreadyExists(Signature),

    /// The request itself is malformed: missing attributes, a declared size
    /// that disagrees with the streamed bytes, or an out-of-bounds range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller is not allowed to access this block.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The backend did not answer in time.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// An I/O error from the backing medium.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend failed in a way the caller cannot act on.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors returned by [`DatasetCatalog`](crate::DatasetCatalog) operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No dataset is published under the given tag.
    #[error("dataset not found: {0}")]
    NotFound(Tag),

    /// The request is malformed (empty dataset name, empty version).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Fjall database error.
    #[error("fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] postcard::Error),

    /// An I/O error from the backing medium.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend failed in a way the caller cannot act on.
    #[error("internal error: {0}")]
    Internal(String),
}
