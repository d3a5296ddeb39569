//! Error types for the engine, plus the exposure-agnostic classification
//! every adapter maps from.

use aetherfs_blocks::BlockError;
use aetherfs_store::{CatalogError, StoreError};
use aetherfs_types::Signature;

/// Exposure-agnostic error classification.
///
/// The engine classifies every failure into one of these kinds; each
/// exposure surface maps the kind to its own idiom (HTTP status, POSIX
/// errno) exactly once. Adapters never branch on concrete error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request is malformed or violates a precondition.
    InvalidArgument,
    /// The addressed dataset, tag, block, or path does not exist.
    NotFound,
    /// The content is already present. Benign on the publish path.
    AlreadyExists,
    /// The caller has not authenticated.
    Unauthenticated,
    /// The caller is authenticated but not allowed.
    PermissionDenied,
    /// The backend did not answer in time.
    DeadlineExceeded,
    /// Everything else.
    Internal,
}

/// Errors produced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Block segmentation or materialization failed.
    #[error("block error: {0}")]
    Block(#[from] BlockError),

    /// The block store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The dataset catalog failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// An I/O error against the local disk.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A block named by the dataset is gone or unreadable — the data it
    /// carried cannot be reconstructed.
    #[error("missing data: block {0} is not retrievable")]
    MissingBlock(Signature),

    /// The caller may not read this data.
    #[error("unauthorized")]
    Unauthorized,

    /// The backend did not answer in time.
    #[error("timeout")]
    Timeout,

    /// Read or seek on a node that is not a file.
    #[error("not a file")]
    NotAFile,

    /// Directory listing on a node that is not a directory.
    #[error("not a directory")]
    NotADirectory,

    /// A seek computed a negative position.
    #[error("negative seek position")]
    NegativeSeek,

    /// The path names a more specific part without its parents
    /// (a file path without a tag, a tag without a dataset).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The addressed entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// One or more destinations failed during a multi-host publish.
    #[error("publish failed for {} destination(s)", .0.len())]
    PublishFailed(Vec<crate::publisher::PublishFailure>),
}

impl EngineError {
    /// Classify this error for adapter-side mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Block(err) => match err {
                BlockError::InvalidBlockSize | BlockError::UnknownAlgorithm(_) => {
                    ErrorKind::InvalidArgument
                }
                _ => ErrorKind::Internal,
            },
            Self::Store(err) => match err {
                StoreError::NotFound(_) => ErrorKind::NotFound,
                StoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
                StoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
                StoreError::PermissionDenied(_) => ErrorKind::PermissionDenied,
                StoreError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
                StoreError::Io(_) | StoreError::Internal(_) => ErrorKind::Internal,
            },
            Self::Catalog(err) => match err {
                CatalogError::NotFound(_) => ErrorKind::NotFound,
                CatalogError::InvalidArgument(_) => ErrorKind::InvalidArgument,
                _ => ErrorKind::Internal,
            },
            Self::Io(_) => ErrorKind::Internal,
            Self::MissingBlock(_) => ErrorKind::NotFound,
            Self::Unauthorized => ErrorKind::PermissionDenied,
            Self::Timeout => ErrorKind::DeadlineExceeded,
            Self::NotAFile => ErrorKind::InvalidArgument,
            Self::NotADirectory => ErrorKind::InvalidArgument,
            Self::NegativeSeek => ErrorKind::InvalidArgument,
            Self::InvalidPath(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PublishFailed(_) => ErrorKind::Internal,
        }
    }

    /// Translate to a POSIX-style I/O error.
    ///
    /// The single mapping used by filesystem-shaped adapters (WebDAV, NFS,
    /// local mounts); protocol adapters map [`ErrorKind`] to status codes
    /// instead.
    pub fn into_io_error(self) -> std::io::Error {
        let kind = match self.kind() {
            ErrorKind::InvalidArgument => std::io::ErrorKind::InvalidInput,
            ErrorKind::NotFound => std::io::ErrorKind::NotFound,
            ErrorKind::AlreadyExists => std::io::ErrorKind::AlreadyExists,
            ErrorKind::Unauthenticated | ErrorKind::PermissionDenied => {
                std::io::ErrorKind::PermissionDenied
            }
            ErrorKind::DeadlineExceeded => std::io::ErrorKind::TimedOut,
            ErrorKind::Internal => std::io::ErrorKind::Other,
        };

        std::io::Error::new(kind, self)
    }
}

/// Translate a block-store failure observed on the read path.
///
/// A missing block means the data is gone or corrupted — fatal for the
/// read, not a soft miss.
pub(crate) fn translate_read_error(err: StoreError, signature: &Signature) -> EngineError {
    match err {
        StoreError::NotFound(_) => EngineError::MissingBlock(signature.clone()),
        StoreError::PermissionDenied(_) => EngineError::Unauthorized,
        StoreError::DeadlineExceeded => EngineError::Timeout,
        other => EngineError::Store(other),
    }
}
