//! Collaborator traits for block persistence and dataset metadata.

use aetherfs_types::{Dataset, Signature, Tag};
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::{CatalogError, StoreError};

/// In-flight parts per block transfer.
///
/// Combined with the fixed wire part length this caps the bytes buffered
/// between a producer and a consumer of one streaming call.
pub const PART_CHANNEL_DEPTH: usize = 4;

/// Sending half of a block part stream.
pub type PartSender = mpsc::Sender<Bytes>;

/// Receiving half of an upload part stream.
pub type PartReceiver = mpsc::Receiver<Bytes>;

/// A ranged download stream: parts in order, errors inline.
pub type RangeStream = mpsc::Receiver<Result<Bytes, StoreError>>;

/// Create a bounded channel for streaming one block's parts.
pub fn part_channel() -> (PartSender, PartReceiver) {
    mpsc::channel(PART_CHANNEL_DEPTH)
}

/// Content-addressed block persistence.
///
/// Blocks are immutable once stored and shared indefinitely across datasets;
/// the signature is both the dedup key and the storage key. Implementations
/// must be `Send + Sync`; the engine holds them behind `Arc<dyn BlockStore>`
/// so surfaces stay transport-agnostic.
#[async_trait::async_trait]
pub trait BlockStore: Send + Sync {
    /// Check whether a block is already stored.
    async fn exists(&self, signature: &Signature) -> Result<bool, StoreError>;

    /// Store a block from a stream of parts.
    ///
    /// `declared_size` is the total byte count the stream will carry; a
    /// mismatch is `InvalidArgument`. A block that is already stored yields
    /// `AlreadyExists`, which callers treat as success — it may be reported
    /// before, during, or after the parts are consumed.
    async fn put_block(
        &self,
        signature: &Signature,
        declared_size: u64,
        parts: PartReceiver,
    ) -> Result<(), StoreError>;

    /// Stream `size` bytes of a block starting at `offset`.
    ///
    /// Parts arrive in order on the returned stream. Requests past the end
    /// of the block are `InvalidArgument`; a request extending beyond the
    /// stored bytes is truncated to what the block holds.
    async fn get_range(
        &self,
        signature: &Signature,
        offset: u64,
        size: u64,
    ) -> Result<RangeStream, StoreError>;
}

/// Dataset metadata and tag resolution.
///
/// A dataset becomes visible only when [`publish`](DatasetCatalog::publish)
/// succeeds; publishing repoints each tag at the new dataset in one step.
#[async_trait::async_trait]
pub trait DatasetCatalog: Send + Sync {
    /// List dataset names, optionally restricted to an `@scope`.
    ///
    /// Scoped names are returned in full (`@scope/name`).
    async fn list_datasets(&self, scope: Option<&str>) -> Result<Vec<String>, CatalogError>;

    /// List the tags published for a dataset name.
    async fn list_tags(&self, dataset: &str) -> Result<Vec<Tag>, CatalogError>;

    /// Resolve a tag to its current dataset.
    async fn lookup(&self, tag: &Tag) -> Result<Dataset, CatalogError>;

    /// Publish a dataset under the given tags.
    ///
    /// Tags resolve to the new dataset only once this call returns `Ok`.
    async fn publish(&self, dataset: &Dataset, tags: &[Tag]) -> Result<(), CatalogError>;
}

/// Reject tags that cannot name a dataset.
pub(crate) fn validate_tags(tags: &[Tag]) -> Result<(), CatalogError> {
    if tags.is_empty() {
        return Err(CatalogError::InvalidArgument(
            "at least one tag is required".to_string(),
        ));
    }

    for tag in tags {
        if tag.dataset.is_empty() || tag.version.is_empty() {
            return Err(CatalogError::InvalidArgument(format!(
                "tag must carry a dataset name and version: {tag}"
            )));
        }
    }

    Ok(())
}
