//! Shared test harness for AetherFS integration tests.
//!
//! Provides [`TestHub`] — one publish destination backed by in-memory
//! collaborators, exercising the full engine pipeline: tree scan →
//! segmentation → content addressing → dedup-aware upload → catalog
//! publish → random-access reads.

use std::path::Path;
use std::sync::Arc;

use aetherfs_blocks::{Segmenter, scan_tree};
use aetherfs_engine::{DatasetReader, Publisher, VirtualFs};
use aetherfs_store::{BlockStore, DatasetCatalog, MemoryBlockStore, MemoryCatalog};
use aetherfs_types::{Dataset, Tag};

/// An in-memory publish destination with observable upload counts.
pub struct TestHub {
    store: Arc<MemoryBlockStore>,
    catalog: Arc<MemoryCatalog>,
}

impl Default for TestHub {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHub {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryBlockStore::new()),
            catalog: Arc::new(MemoryCatalog::new()),
        }
    }

    /// The hub's block store, as the engine sees it.
    pub fn blocks(&self) -> Arc<dyn BlockStore> {
        Arc::clone(&self.store) as Arc<dyn BlockStore>
    }

    /// The hub's dataset catalog, as the engine sees it.
    pub fn datasets(&self) -> Arc<dyn DatasetCatalog> {
        Arc::clone(&self.catalog) as Arc<dyn DatasetCatalog>
    }

    /// Number of uploads that stored new content (dedup hits excluded).
    pub fn stored_puts(&self) -> u64 {
        self.store.puts_stored()
    }

    /// A virtual file system over this hub.
    pub fn vfs(&self) -> VirtualFs {
        VirtualFs::new(self.blocks(), self.datasets())
    }

    /// Write `files` to a temp tree and publish it under `address`.
    pub async fn publish_tree(
        &self,
        address: &str,
        block_size: u32,
        files: &[(&str, Vec<u8>)],
    ) -> Arc<Dataset> {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), files);

        let sources = scan_tree(dir.path()).unwrap();
        let layout = Segmenter::new(block_size)
            .unwrap()
            .segment(&sources)
            .unwrap();

        let publisher = Publisher::new(self.blocks(), self.datasets());
        let tag: Tag = address.parse().unwrap();
        let dataset = publisher.publish(&layout, &[tag]).await.unwrap();

        Arc::new(dataset)
    }

    /// Open a reader over one file of a published dataset.
    pub fn reader(&self, dataset: &Arc<Dataset>, name: &str) -> DatasetReader {
        let index = dataset
            .files
            .iter()
            .position(|f| f.name == name)
            .unwrap_or_else(|| panic!("no such file in dataset: {name}"));
        DatasetReader::new(Arc::clone(dataset), self.blocks(), index)
    }
}

/// Write a file tree under `root`. Names are `/`-separated relative paths.
pub fn write_tree(root: &Path, files: &[(&str, Vec<u8>)]) {
    for (name, data) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, data).unwrap();
    }
}

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    test_data_seeded(size, 0xDEAD_BEEF)
}

/// Generate test data with a specific seed (for unique files).
pub fn test_data_seeded(size: usize, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = seed;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}
