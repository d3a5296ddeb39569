//! In-memory backends for tests and memory-only operation.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use aetherfs_types::{Dataset, PART_SIZE, Signature, Tag};
use bytes::Bytes;
use tracing::debug;

use crate::error::{CatalogError, StoreError};
use crate::traits::{
    BlockStore, DatasetCatalog, PART_CHANNEL_DEPTH, PartReceiver, RangeStream, validate_tags,
};

/// In-memory block store backed by a `RwLock<BTreeMap>`.
///
/// Tracks how many uploads actually landed, so tests can observe that a
/// re-publish of unchanged content stored nothing new.
#[derive(Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<BTreeMap<Signature, Bytes>>,
    puts_stored: AtomicU64,
}

impl MemoryBlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uploads that stored new content (dedup hits excluded).
    pub fn puts_stored(&self) -> u64 {
        self.puts_stored.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl BlockStore for MemoryBlockStore {
    async fn exists(&self, signature: &Signature) -> Result<bool, StoreError> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(signature))
    }

    async fn put_block(
        &self,
        signature: &Signature,
        declared_size: u64,
        mut parts: PartReceiver,
    ) -> Result<(), StoreError> {
        // Dedup short-circuit at stream open.
        if self.exists(signature).await? {
            return Err(StoreError::AlreadyExists(signature.clone()));
        }

        let mut data = Vec::with_capacity(declared_size as usize);
        while let Some(part) = parts.recv().await {
            data.extend_from_slice(&part);
            if data.len() as u64 > declared_size {
                return Err(StoreError::InvalidArgument(format!(
                    "stream exceeds declared size of {declared_size} bytes"
                )));
            }
        }

        if data.len() as u64 != declared_size {
            return Err(StoreError::InvalidArgument(format!(
                "declared {declared_size} bytes, received {}",
                data.len()
            )));
        }

        let mut map = self.blocks.write().expect("lock poisoned");
        // A concurrent upload may have won the race while we were streaming.
        if map.contains_key(signature) {
            return Err(StoreError::AlreadyExists(signature.clone()));
        }

        debug!(%signature, size = data.len(), "stored block in memory");
        map.insert(signature.clone(), Bytes::from(data));
        self.puts_stored.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn get_range(
        &self,
        signature: &Signature,
        offset: u64,
        size: u64,
    ) -> Result<RangeStream, StoreError> {
        let data = {
            let map = self.blocks.read().expect("lock poisoned");
            map.get(signature)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(signature.clone()))?
        };

        if offset > data.len() as u64 {
            return Err(StoreError::InvalidArgument(format!(
                "offset {offset} past end of {} byte block",
                data.len()
            )));
        }

        let end = (offset + size).min(data.len() as u64);
        let slice = data.slice(offset as usize..end as usize);

        let (tx, rx) = tokio::sync::mpsc::channel(PART_CHANNEL_DEPTH);
        tokio::spawn(async move {
            let mut sent = 0usize;
            while sent < slice.len() {
                let end = (sent + PART_SIZE as usize).min(slice.len());
                if tx.send(Ok(slice.slice(sent..end))).await.is_err() {
                    // Receiver hung up; nothing left to do.
                    return;
                }
                sent = end;
            }
        });

        Ok(rx)
    }
}

/// In-memory dataset catalog backed by `RwLock<BTreeMap>`s.
#[derive(Default)]
pub struct MemoryCatalog {
    /// `(dataset name, version)` → dataset.
    datasets: RwLock<BTreeMap<(String, String), Dataset>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DatasetCatalog for MemoryCatalog {
    async fn list_datasets(&self, scope: Option<&str>) -> Result<Vec<String>, CatalogError> {
        let map = self.datasets.read().expect("lock poisoned");

        let mut names: Vec<String> = map.keys().map(|(name, _)| name.clone()).collect();
        names.dedup();

        if let Some(scope) = scope {
            let prefix = format!("{scope}/");
            names.retain(|name| name.starts_with(&prefix));
        }

        Ok(names)
    }

    async fn list_tags(&self, dataset: &str) -> Result<Vec<Tag>, CatalogError> {
        let map = self.datasets.read().expect("lock poisoned");

        Ok(map
            .keys()
            .filter(|(name, _)| name == dataset)
            .map(|(name, version)| Tag {
                host: String::new(),
                dataset: name.clone(),
                version: version.clone(),
            })
            .collect())
    }

    async fn lookup(&self, tag: &Tag) -> Result<Dataset, CatalogError> {
        let map = self.datasets.read().expect("lock poisoned");

        map.get(&(tag.dataset.clone(), tag.version.clone()))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(tag.clone()))
    }

    async fn publish(&self, dataset: &Dataset, tags: &[Tag]) -> Result<(), CatalogError> {
        validate_tags(tags)?;

        let mut map = self.datasets.write().expect("lock poisoned");
        for tag in tags {
            debug!(%tag, "publishing dataset");
            map.insert(
                (tag.dataset.clone(), tag.version.clone()),
                dataset.clone(),
            );
        }

        Ok(())
    }
}
