//! Integration test: block-level deduplication.
//!
//! Identical bytes must produce identical signatures and never be stored
//! twice — across versions, across datasets, and across retried publishes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use aetherfs_blocks::{Segmenter, scan_tree};
use aetherfs_engine::Publisher;
use aetherfs_store::{BlockStore, DatasetCatalog, PartReceiver, RangeStream, StoreError};
use aetherfs_types::{Signature, Tag};

use aetherfs_integration_tests::{TestHub, test_data_seeded, write_tree};

/// Republishing unchanged content under a new tag uploads zero blocks.
#[tokio::test]
async fn test_republish_uploads_nothing() {
    let hub = TestHub::new();
    let data = test_data_seeded(20_000, 5);

    let source = tempfile::tempdir().unwrap();
    write_tree(source.path(), &[("blob.bin", data)]);
    let sources = scan_tree(source.path()).unwrap();
    let layout = Segmenter::new(1024).unwrap().segment(&sources).unwrap();

    let publisher = Publisher::new(hub.blocks(), hub.datasets());

    let v1: Tag = "ds:v1".parse().unwrap();
    publisher.publish(&layout, &[v1]).await.unwrap();
    let stored_once = hub.stored_puts();
    assert_eq!(stored_once, 20); // ceil(20000 / 1024)

    let v2: Tag = "ds:v2".parse().unwrap();
    publisher.publish(&layout, &[v2.clone()]).await.unwrap();
    assert_eq!(hub.stored_puts(), stored_once, "republish must dedup every block");

    // The new tag still resolves and reads back.
    let dataset = Arc::new(hub.datasets().lookup(&v2).await.unwrap());
    let mut reader = hub.reader(&dataset, "blob.bin");
    assert_eq!(reader.read_to_end().await.unwrap().len(), 20_000);
}

/// Identical bytes in unrelated datasets share blocks.
#[tokio::test]
async fn test_cross_dataset_dedup() {
    let hub = TestHub::new();
    let shared = test_data_seeded(8_192, 77);

    // Same bytes under different names in different datasets; block size
    // divides the content so the block boundaries line up.
    hub.publish_tree("first:v1", 1024, &[("original.bin", shared.clone())])
        .await;
    let after_first = hub.stored_puts();
    assert_eq!(after_first, 8);

    hub.publish_tree("second:v1", 1024, &[("copy.bin", shared.clone())])
        .await;
    assert_eq!(hub.stored_puts(), after_first, "identical content must not re-upload");

    // Distinct content does upload.
    hub.publish_tree("third:v1", 1024, &[("other.bin", test_data_seeded(8_192, 78))])
        .await;
    assert_eq!(hub.stored_puts(), after_first + 8);
}

/// A block store that fails one specific upload, once.
struct FlakyStore {
    inner: Arc<dyn BlockStore>,
    puts_seen: AtomicU64,
    fail_at: u64,
    failed: AtomicU64,
}

impl FlakyStore {
    fn new(inner: Arc<dyn BlockStore>, fail_at: u64) -> Self {
        Self {
            inner,
            puts_seen: AtomicU64::new(0),
            fail_at,
            failed: AtomicU64::new(0),
        }
    }
}

#[async_trait::async_trait]
impl BlockStore for FlakyStore {
    async fn exists(&self, signature: &Signature) -> Result<bool, StoreError> {
        self.inner.exists(signature).await
    }

    async fn put_block(
        &self,
        signature: &Signature,
        declared_size: u64,
        parts: PartReceiver,
    ) -> Result<(), StoreError> {
        let seen = self.puts_seen.fetch_add(1, Ordering::SeqCst);
        if seen == self.fail_at && self.failed.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(StoreError::Internal("injected failure".to_string()));
        }
        self.inner.put_block(signature, declared_size, parts).await
    }

    async fn get_range(
        &self,
        signature: &Signature,
        offset: u64,
        size: u64,
    ) -> Result<RangeStream, StoreError> {
        self.inner.get_range(signature, offset, size).await
    }
}

/// A publish that dies mid-way leaves its uploaded blocks valid; the
/// retried publish skips them and only uploads the remainder.
#[tokio::test]
async fn test_retried_publish_resumes_via_dedup() {
    let hub = TestHub::new();
    let data = test_data_seeded(10_240, 13); // 10 blocks at 1024

    let source = tempfile::tempdir().unwrap();
    write_tree(source.path(), &[("blob.bin", data.clone())]);
    let sources = scan_tree(source.path()).unwrap();
    let layout = Segmenter::new(1024).unwrap().segment(&sources).unwrap();
    assert_eq!(layout.blocks.len(), 10);

    // Fail the 7th upload.
    let flaky: Arc<dyn BlockStore> = Arc::new(FlakyStore::new(hub.blocks(), 6));
    let publisher = Publisher::new(Arc::clone(&flaky), hub.datasets());

    let tag: Tag = "flaky:v1".parse().unwrap();
    publisher.publish(&layout, &[tag.clone()]).await.unwrap_err();

    // Six blocks landed before the failure; the tag does not resolve yet.
    assert_eq!(hub.stored_puts(), 6);
    assert!(hub.datasets().lookup(&tag).await.is_err());

    // Retry: the six stored blocks dedup, the remaining four upload.
    publisher.publish(&layout, &[tag.clone()]).await.unwrap();
    assert_eq!(hub.stored_puts(), 10);

    let dataset = Arc::new(hub.datasets().lookup(&tag).await.unwrap());
    let mut reader = hub.reader(&dataset, "blob.bin");
    assert_eq!(reader.read_to_end().await.unwrap(), data);
}
