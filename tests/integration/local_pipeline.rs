//! Full local pipeline integration test.
//!
//! Connects aetherfs-blocks + aetherfs-store + aetherfs-engine into a
//! working disk-backed pipeline: scan → segment → publish into a
//! file-based block store and fjall catalog → list → read → materialize.

use std::sync::Arc;

use aetherfs_blocks::{Segmenter, scan_tree};
use aetherfs_engine::{EntryKind, Node, Publisher, VirtualFs, download};
use aetherfs_store::{BlockStore, DatasetCatalog, DiskCatalog, FileBlockStore};
use aetherfs_types::Tag;

use aetherfs_integration_tests::{test_data_seeded, write_tree};

fn tree() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("readme.md", test_data_seeded(300, 1)),
        ("data/train.csv", test_data_seeded(10_000, 2)),
        ("data/test.csv", test_data_seeded(2_500, 3)),
        ("models/weights.bin", test_data_seeded(50_000, 4)),
    ]
}

/// Publish a tree into disk-backed collaborators, then read it back
/// through the virtual file system and materialize it to a new directory.
#[tokio::test]
async fn test_disk_pipeline_round_trip() {
    let source = tempfile::tempdir().unwrap();
    let repo = tempfile::tempdir().unwrap();
    let files = tree();
    write_tree(source.path(), &files);

    let blocks: Arc<dyn BlockStore> =
        Arc::new(FileBlockStore::new(repo.path().join("blocks")).unwrap());
    let catalog: Arc<dyn DatasetCatalog> =
        Arc::new(DiskCatalog::open(repo.path().join("catalog")).unwrap());

    // Publish.
    let sources = scan_tree(source.path()).unwrap();
    let layout = Segmenter::new(4096).unwrap().segment(&sources).unwrap();
    let publisher = Publisher::new(Arc::clone(&blocks), Arc::clone(&catalog));
    let tag: Tag = "corpus:v1".parse().unwrap();
    let dataset = publisher.publish(&layout, &[tag]).await.unwrap();
    assert_eq!(dataset.files.len(), 4);

    // List through the virtual file system.
    let vfs = VirtualFs::new(Arc::clone(&blocks), Arc::clone(&catalog));

    let root = vfs.open("/corpus/v1").await.unwrap();
    let entries = root.entries().unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["data", "models", "readme.md"]);
    assert_eq!(entries[0].kind, EntryKind::Directory);
    assert_eq!(entries[2].kind, EntryKind::File);

    // Read one file through the same surface.
    let node = vfs.open("/corpus/v1/data/train.csv").await.unwrap();
    assert!(matches!(node, Node::File { .. }));
    let mut reader = node.into_reader().unwrap();
    let got = reader.read_to_end().await.unwrap();
    assert_eq!(got, test_data_seeded(10_000, 2));

    // Materialize the whole dataset and compare every file.
    let dest = tempfile::tempdir().unwrap();
    download(Arc::new(dataset), Arc::clone(&blocks), dest.path())
        .await
        .unwrap();

    for (name, expected) in &files {
        let got = std::fs::read(dest.path().join(name)).unwrap();
        assert_eq!(&got, expected, "materialized file {name}");
    }
}

/// Blocks and catalog entries survive a process restart: reopen both
/// stores from disk and read the dataset back.
#[tokio::test]
async fn test_persistence_across_reopen() {
    let source = tempfile::tempdir().unwrap();
    let repo = tempfile::tempdir().unwrap();
    let files = tree();
    write_tree(source.path(), &files);

    // Write in one "process".
    {
        let blocks: Arc<dyn BlockStore> =
            Arc::new(FileBlockStore::new(repo.path().join("blocks")).unwrap());
        let catalog: Arc<dyn DatasetCatalog> =
            Arc::new(DiskCatalog::open(repo.path().join("catalog")).unwrap());

        let sources = scan_tree(source.path()).unwrap();
        let layout = Segmenter::new(4096).unwrap().segment(&sources).unwrap();
        let publisher = Publisher::new(blocks, catalog);
        let tag: Tag = "persist:v1".parse().unwrap();
        publisher.publish(&layout, &[tag]).await.unwrap();
    }

    // Reopen and read in another.
    {
        let blocks: Arc<dyn BlockStore> =
            Arc::new(FileBlockStore::new(repo.path().join("blocks")).unwrap());
        let catalog: Arc<dyn DatasetCatalog> =
            Arc::new(DiskCatalog::open(repo.path().join("catalog")).unwrap());

        let vfs = VirtualFs::new(blocks, catalog);
        for (name, expected) in &files {
            let node = vfs.open(&format!("/persist/v1/{name}")).await.unwrap();
            let mut reader = node.into_reader().unwrap();
            let got = reader.read_to_end().await.unwrap();
            assert_eq!(&got, expected, "reopened file {name}");
        }
    }
}

/// Republishing a tag points it at the new dataset; the old version stays
/// readable under its own tag.
#[tokio::test]
async fn test_tag_repoint_keeps_old_version_readable() {
    let repo = tempfile::tempdir().unwrap();
    let blocks: Arc<dyn BlockStore> =
        Arc::new(FileBlockStore::new(repo.path().join("blocks")).unwrap());
    let catalog: Arc<dyn DatasetCatalog> =
        Arc::new(DiskCatalog::open(repo.path().join("catalog")).unwrap());
    let publisher = Publisher::new(Arc::clone(&blocks), Arc::clone(&catalog));

    let old = test_data_seeded(5_000, 10);
    let new = test_data_seeded(6_000, 11);

    for (data, tags) in [
        (&old, vec!["ds:v1", "ds:latest"]),
        (&new, vec!["ds:v2", "ds:latest"]),
    ] {
        let source = tempfile::tempdir().unwrap();
        write_tree(source.path(), &[("blob.bin", data.clone())]);
        let sources = scan_tree(source.path()).unwrap();
        let layout = Segmenter::new(4096).unwrap().segment(&sources).unwrap();
        let tags: Vec<Tag> = tags.iter().map(|t| t.parse().unwrap()).collect();
        publisher.publish(&layout, &tags).await.unwrap();
    }

    let vfs = VirtualFs::new(blocks, catalog);

    for (path, expected) in [
        ("/ds/v1/blob.bin", &old),
        ("/ds/v2/blob.bin", &new),
        ("/ds/latest/blob.bin", &new),
    ] {
        let node = vfs.open(path).await.unwrap();
        let mut reader = node.into_reader().unwrap();
        let got = reader.read_to_end().await.unwrap();
        assert_eq!(&got, expected, "{path}");
    }
}
