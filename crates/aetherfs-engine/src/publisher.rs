//! The dedup-aware streaming upload pipeline.

use std::fmt;
use std::sync::Arc;

use aetherfs_blocks::{HashAlgorithm, Segmentation, compute_signature};
use aetherfs_store::{BlockStore, DatasetCatalog, StoreError, part_channel};
use aetherfs_types::{Dataset, PART_SIZE, Signature, Tag};
use bytes::Bytes;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::EngineError;

/// Publishes segmented file trees to one destination.
///
/// Blocks are materialized into a single reusable buffer, signed, and
/// streamed in fixed-size parts; memory stays bounded at one block
/// regardless of dataset size. A block the destination already holds is
/// skipped, whether the destination says so before, during, or after the
/// stream — retrying a failed publish therefore re-uploads nothing that
/// already landed.
///
/// A publisher is single-owner: uploads within one destination are strictly
/// sequential. Use [`publish_all`] to fan out across destinations.
pub struct Publisher {
    blocks: Arc<dyn BlockStore>,
    datasets: Arc<dyn DatasetCatalog>,
    algorithm: HashAlgorithm,
}

impl Publisher {
    /// Create a publisher with the default signature algorithm.
    pub fn new(blocks: Arc<dyn BlockStore>, datasets: Arc<dyn DatasetCatalog>) -> Self {
        Self::with_algorithm(blocks, datasets, HashAlgorithm::default())
    }

    /// Create a publisher with an explicit signature algorithm.
    pub fn with_algorithm(
        blocks: Arc<dyn BlockStore>,
        datasets: Arc<dyn DatasetCatalog>,
        algorithm: HashAlgorithm,
    ) -> Self {
        Self {
            blocks,
            datasets,
            algorithm,
        }
    }

    /// Upload every block of `layout`, then publish the dataset under `tags`.
    ///
    /// Blocks are uploaded in stream order. Any failure other than the dedup
    /// signal aborts the publish; blocks stored before the failure remain
    /// valid and content-addressed, so a retry skips them. The tags resolve
    /// to the new dataset only once the final catalog call succeeds.
    pub async fn publish(
        &self,
        layout: &Segmentation,
        tags: &[Tag],
    ) -> Result<Dataset, EngineError> {
        let mut dataset = Dataset {
            block_size: layout.block_size,
            files: layout.files.clone(),
            blocks: Vec::with_capacity(layout.blocks.len()),
        };

        // One buffer for the whole publish.
        let mut buf = vec![0u8; layout.block_size as usize];

        for block in &layout.blocks {
            let n = block.read_into(&mut buf).await?;
            let signature = compute_signature(self.algorithm, &buf[..n]);
            dataset.blocks.push(signature.clone());

            if self.blocks.exists(&signature).await? {
                debug!(%signature, "block already exists");
                continue;
            }

            match self.upload(&signature, &buf[..n]).await {
                Ok(()) => debug!(%signature, size = n, "uploaded block"),
                Err(StoreError::AlreadyExists(_)) => {
                    debug!(%signature, "block already exists");
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.datasets.publish(&dataset, tags).await?;

        info!(
            files = dataset.files.len(),
            blocks = dataset.blocks.len(),
            "published dataset"
        );

        Ok(dataset)
    }

    /// Stream one materialized block to the destination in fixed-size parts.
    async fn upload(&self, signature: &Signature, data: &[u8]) -> Result<(), StoreError> {
        let data = Bytes::copy_from_slice(data);
        let (tx, rx) = part_channel();

        let send = async {
            let mut sent = 0usize;
            while sent < data.len() {
                let end = (sent + PART_SIZE as usize).min(data.len());
                if tx.send(data.slice(sent..end)).await.is_err() {
                    // The destination stopped reading; it reports why.
                    break;
                }
                sent = end;
            }
            drop(tx);
        };

        let (result, ()) = tokio::join!(
            self.blocks.put_block(signature, data.len() as u64, rx),
            send
        );

        result
    }
}

/// One destination of a multi-host publish.
pub struct PublishTarget {
    /// Destination host, used only for reporting.
    pub host: String,
    /// The destination's block store.
    pub blocks: Arc<dyn BlockStore>,
    /// The destination's dataset catalog.
    pub datasets: Arc<dyn DatasetCatalog>,
    /// Tags to publish at this destination.
    pub tags: Vec<Tag>,
}

/// A failed destination within a multi-host publish.
#[derive(Debug)]
pub struct PublishFailure {
    /// The destination that failed.
    pub host: String,
    /// Why it failed.
    pub error: EngineError,
}

impl fmt::Display for PublishFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.host, self.error)
    }
}

/// Publish one layout to several destinations concurrently.
///
/// Each destination gets its own pipeline instance running as an
/// independent task; one destination failing does not stop the others.
/// Failures are collected and reported jointly so no error masks another.
pub async fn publish_all(
    targets: Vec<PublishTarget>,
    layout: Arc<Segmentation>,
    algorithm: HashAlgorithm,
) -> Result<Vec<(String, Dataset)>, EngineError> {
    let mut set = JoinSet::new();

    for target in targets {
        let layout = Arc::clone(&layout);
        set.spawn(async move {
            let publisher =
                Publisher::with_algorithm(target.blocks, target.datasets, algorithm);
            let result = publisher.publish(&layout, &target.tags).await;
            (target.host, result)
        });
    }

    let mut published = Vec::new();
    let mut failures = Vec::new();

    while let Some(joined) = set.join_next().await {
        let (host, result) = joined.expect("publish task panicked");
        match result {
            Ok(dataset) => published.push((host, dataset)),
            Err(error) => failures.push(PublishFailure { host, error }),
        }
    }

    if !failures.is_empty() {
        return Err(EngineError::PublishFailed(failures));
    }

    Ok(published)
}
