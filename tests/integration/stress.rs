//! Integration test: stress.
//!
//! Concurrent readers, concurrent multi-destination publishes, and
//! concurrent materialization. Verifies no data corruption under load.

use std::sync::Arc;

use aetherfs_blocks::{HashAlgorithm, Segmenter, scan_tree};
use aetherfs_engine::{PublishTarget, download, publish_all};
use aetherfs_store::{MemoryBlockStore, MemoryCatalog};
use tokio::sync::Barrier;

use aetherfs_integration_tests::{TestHub, test_data_seeded, write_tree};

/// 10 concurrent readers over the same dataset, each making 100
/// random-access reads. Readers are single-owner, so every task gets its
/// own cursor; the store underneath is shared.
#[tokio::test]
#[ntest::timeout(60000)]
async fn test_concurrent_readers_no_corruption() {
    let hub = Arc::new(TestHub::new());
    let full = Arc::new(test_data_seeded(200_000, 21));
    let dataset = hub
        .publish_tree("stress:v1", 4096, &[("blob.bin", full.as_ref().clone())])
        .await;

    let barrier = Arc::new(Barrier::new(10));
    let mut handles = Vec::new();

    for reader_id in 0..10u32 {
        let hub = Arc::clone(&hub);
        let dataset = Arc::clone(&dataset);
        let full = Arc::clone(&full);
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier.wait().await; // Start all readers simultaneously.

            let mut state = 0x9E37_79B9u32 ^ reader_id;
            let mut next = |bound: usize| {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                (state >> 8) as usize % bound
            };

            for _ in 0..100 {
                let offset = next(full.len());
                let len = 1 + next(30_000);

                let mut reader = hub.reader(&dataset, "blob.bin");
                reader
                    .seek(std::io::SeekFrom::Start(offset as u64))
                    .unwrap();

                let mut buf = vec![0u8; len];
                let n = reader.read(&mut buf).await.unwrap();

                let expected = &full[offset..(offset + len).min(full.len())];
                assert_eq!(&buf[..n], expected, "reader {reader_id} offset {offset} len {len}");
            }
        }));
    }

    for h in handles {
        h.await.unwrap();
    }
}

/// Publish one layout to 8 destinations concurrently. Every destination
/// must derive the identical dataset and store every block exactly once.
#[tokio::test]
#[ntest::timeout(60000)]
async fn test_concurrent_multi_destination_publish() {
    let source = tempfile::tempdir().unwrap();
    let files: Vec<(String, Vec<u8>)> = (0..20)
        .map(|i| (format!("f{i:02}.bin"), test_data_seeded(3_000 + i * 100, i as u32)))
        .collect();
    let named: Vec<(&str, Vec<u8>)> = files
        .iter()
        .map(|(n, d)| (n.as_str(), d.clone()))
        .collect();
    write_tree(source.path(), &named);

    let sources = scan_tree(source.path()).unwrap();
    let layout = Arc::new(Segmenter::new(2048).unwrap().segment(&sources).unwrap());
    let block_count = layout.blocks.len();

    let stores: Vec<Arc<MemoryBlockStore>> =
        (0..8).map(|_| Arc::new(MemoryBlockStore::new())).collect();

    let targets = stores
        .iter()
        .enumerate()
        .map(|(i, store)| PublishTarget {
            host: format!("host-{i}.example.com"),
            blocks: Arc::clone(store) as Arc<dyn aetherfs_store::BlockStore>,
            datasets: Arc::new(MemoryCatalog::new()),
            tags: vec!["fanout:v1".parse().unwrap()],
        })
        .collect();

    let published = publish_all(targets, layout, HashAlgorithm::Sha256)
        .await
        .unwrap();

    assert_eq!(published.len(), 8);
    let (_, first) = &published[0];
    assert!(published.iter().all(|(_, d)| d == first), "destinations diverged");

    for store in &stores {
        assert_eq!(store.puts_stored() as usize, block_count);
    }
}

/// Materialize the same dataset into several directories at once; every
/// copy must be byte-identical to the source.
#[tokio::test]
#[ntest::timeout(60000)]
async fn test_concurrent_downloads() {
    let hub = TestHub::new();
    let files: Vec<(String, Vec<u8>)> = (0..10)
        .map(|i| (format!("part-{i}.bin"), test_data_seeded(15_000, 100 + i as u32)))
        .collect();
    let named: Vec<(&str, Vec<u8>)> = files
        .iter()
        .map(|(n, d)| (n.as_str(), d.clone()))
        .collect();

    let dataset = hub.publish_tree("dl:v1", 4096, &named).await;

    let mut handles = Vec::new();
    let mut dests = Vec::new();

    for _ in 0..4 {
        let dest = tempfile::tempdir().unwrap();
        let dataset = Arc::clone(&dataset);
        let blocks = hub.blocks();
        let path = dest.path().to_path_buf();
        dests.push(dest);

        handles.push(tokio::spawn(async move {
            download(dataset, blocks, path).await.unwrap();
        }));
    }

    for h in handles {
        h.await.unwrap();
    }

    for dest in &dests {
        for (name, expected) in &files {
            let got = std::fs::read(dest.path().join(name)).unwrap();
            assert_eq!(&got, expected, "{name}");
        }
    }
}
