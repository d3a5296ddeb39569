//! File-based block storage backend.
//!
//! Stores one file per block with a 2-level fan-out directory structure:
//! `{base_dir}/{sig[0..2]}/{sig[2..4]}/{sig}`.

use std::path::{Path, PathBuf};

use aetherfs_types::{PART_SIZE, Signature};
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, SeekFrom};
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{BlockStore, PART_CHANNEL_DEPTH, PartReceiver, RangeStream};

/// File-based block store with 2-level fan-out directory layout.
///
/// Writes are atomic: parts are streamed to a temporary file first, then
/// renamed into place, so a crashed upload never leaves a half-written block
/// under its signature.
pub struct FileBlockStore {
    base_dir: PathBuf,
}

impl FileBlockStore {
    /// Create a block store rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Compute the full file path for a signature.
    fn block_path(&self, signature: &Signature) -> PathBuf {
        let sig = signature.as_str();
        self.base_dir.join(&sig[0..2]).join(&sig[2..4]).join(sig)
    }
}

#[async_trait::async_trait]
impl BlockStore for FileBlockStore {
    async fn exists(&self, signature: &Signature) -> Result<bool, StoreError> {
        match tokio::fs::metadata(self.block_path(signature)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn put_block(
        &self,
        signature: &Signature,
        declared_size: u64,
        mut parts: PartReceiver,
    ) -> Result<(), StoreError> {
        let path = self.block_path(signature);

        // Dedup short-circuit at stream open.
        if self.exists(signature).await? {
            return Err(StoreError::AlreadyExists(signature.clone()));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = path.with_extension("tmp");
        let mut tmp = tokio::fs::File::create(&tmp_path).await?;

        let mut written = 0u64;
        while let Some(part) = parts.recv().await {
            written += part.len() as u64;
            if written > declared_size {
                drop(tmp);
                let _ = tokio::fs::remove_file(&tmp_path).await;
                return Err(StoreError::InvalidArgument(format!(
                    "stream exceeds declared size of {declared_size} bytes"
                )));
            }
            tmp.write_all(&part).await?;
        }

        if written != declared_size {
            drop(tmp);
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::InvalidArgument(format!(
                "declared {declared_size} bytes, received {written}"
            )));
        }

        tmp.flush().await?;
        drop(tmp);
        tokio::fs::rename(&tmp_path, &path).await?;

        debug!(%signature, size = written, path = %path.display(), "stored block to file");
        Ok(())
    }

    async fn get_range(
        &self,
        signature: &Signature,
        offset: u64,
        size: u64,
    ) -> Result<RangeStream, StoreError> {
        let path = self.block_path(signature);

        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(signature.clone()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let len = file.metadata().await?.len();
        if offset > len {
            return Err(StoreError::InvalidArgument(format!(
                "offset {offset} past end of {len} byte block"
            )));
        }

        file.seek(SeekFrom::Start(offset)).await?;
        let mut remaining = size.min(len - offset);

        let (tx, rx) = tokio::sync::mpsc::channel(PART_CHANNEL_DEPTH);
        tokio::spawn(async move {
            while remaining > 0 {
                let part_len = remaining.min(PART_SIZE) as usize;
                let mut part = BytesMut::zeroed(part_len);

                if let Err(err) = file.read_exact(&mut part).await {
                    let _ = tx.send(Err(StoreError::Io(err))).await;
                    return;
                }

                remaining -= part_len as u64;
                if tx.send(Ok(part.freeze())).await.is_err() {
                    // Receiver hung up mid-read; abandon the stream.
                    return;
                }
            }
        });

        Ok(rx)
    }
}
