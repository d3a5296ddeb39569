//! Whole-dataset materialization to a local directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aetherfs_store::BlockStore;
use aetherfs_types::Dataset;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::EngineError;
use crate::reader::DatasetReader;

/// Materialize every file of `dataset` under `dest`.
///
/// Files download as independent concurrent tasks with unordered
/// completion; each task reads its file sequentially through its own
/// [`DatasetReader`], so per-task memory stays bounded at one block. On
/// failure the partially written file is removed — a partial download is
/// safe to discard and retry.
pub async fn download(
    dataset: Arc<Dataset>,
    blocks: Arc<dyn BlockStore>,
    dest: impl AsRef<Path>,
) -> Result<(), EngineError> {
    let dest = dest.as_ref().to_path_buf();
    let mut set = JoinSet::new();

    for index in 0..dataset.files.len() {
        let dataset = Arc::clone(&dataset);
        let blocks = Arc::clone(&blocks);
        let dest = dest.clone();

        set.spawn(async move {
            let file = &dataset.files[index];
            let path = local_path(&dest, &file.name);
            let reader = DatasetReader::new(Arc::clone(&dataset), blocks, index);

            match write_file(reader, &path).await {
                Ok(()) => {
                    debug!(name = %file.name, size = file.size, "downloaded file");
                    Ok(())
                }
                Err(err) => {
                    let _ = tokio::fs::remove_file(&path).await;
                    Err(err)
                }
            }
        });
    }

    while let Some(joined) = set.join_next().await {
        // Returning early drops the set, aborting the remaining tasks.
        joined.expect("download task panicked")?;
    }

    Ok(())
}

/// Map a dataset-relative name onto the destination directory.
fn local_path(dest: &Path, name: &str) -> PathBuf {
    let mut path = dest.to_path_buf();
    for segment in name.split('/') {
        path.push(segment);
    }
    path
}

async fn write_file(mut reader: DatasetReader, path: &Path) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut out = tokio::fs::File::create(path).await?;

    let mut buf = vec![0u8; reader.size().min(u64::from(reader.block_size())) as usize];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).await?;
    }

    out.flush().await?;
    Ok(())
}
