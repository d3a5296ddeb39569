//! Random-access reconstruction of a virtual file from its dataset's
//! ordered block list.

use std::io::SeekFrom;
use std::sync::Arc;

use aetherfs_store::BlockStore;
use aetherfs_types::Dataset;

use crate::error::{EngineError, translate_read_error};

/// A read cursor over one file inside a dataset.
///
/// The dataset's blocks form a virtual stream: the concatenation of all
/// files in list order. A reader locates its file's slice of that stream
/// and serves arbitrary byte ranges of it from ranged block fetches.
///
/// Readers are single-owner: one cursor, no interior locking. Every
/// exposure surface — HTTP, WebDAV, NFS, CLI pull — delegates to this type
/// rather than re-deriving block arithmetic.
pub struct DatasetReader {
    dataset: Arc<Dataset>,
    blocks: Arc<dyn BlockStore>,
    /// Index of the target file in `dataset.files`.
    file_index: usize,
    /// Cursor within the target file.
    file_offset: u64,
}

impl DatasetReader {
    /// Open a reader over `dataset.files[file_index]`.
    ///
    /// The cursor starts at offset 0.
    pub fn new(dataset: Arc<Dataset>, blocks: Arc<dyn BlockStore>, file_index: usize) -> Self {
        debug_assert!(file_index < dataset.files.len());
        Self {
            dataset,
            blocks,
            file_index,
            file_offset: 0,
        }
    }

    /// The target file's metadata.
    pub fn file(&self) -> &aetherfs_types::File {
        &self.dataset.files[self.file_index]
    }

    /// Size of the target file in bytes.
    pub fn size(&self) -> u64 {
        self.file().size
    }

    /// The dataset's block size in bytes.
    pub fn block_size(&self) -> u32 {
        self.dataset.block_size
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.file_offset
    }

    /// Move the cursor. Pure state update; no I/O.
    ///
    /// Seeking past the end is allowed (a subsequent read returns zero
    /// bytes); a negative resulting position is rejected.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, EngineError> {
        let next = match pos {
            SeekFrom::Start(offset) => {
                self.file_offset = offset;
                return Ok(offset);
            }
            SeekFrom::Current(delta) => self.file_offset as i64 + delta,
            SeekFrom::End(delta) => self.size() as i64 + delta,
        };

        if next < 0 {
            return Err(EngineError::NegativeSeek);
        }

        self.file_offset = next as u64;
        Ok(self.file_offset)
    }

    /// Read from the cursor into `buf`, returning the bytes copied.
    ///
    /// Fewer bytes than `buf.len()` — including zero — signals end of data,
    /// not an error. The read spans every block the range touches; only the
    /// first fetch carries a non-zero offset into its block, and each fetch
    /// is capped at the remaining byte count so the transfer never
    /// over-reads.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, EngineError> {
        let file = &self.dataset.files[self.file_index];

        if buf.is_empty() || self.file_offset >= file.size {
            return Ok(0);
        }

        let block_size = u64::from(self.dataset.block_size);

        // The cursor caps how much of the buffer we can fill.
        let num_bytes_to_read = (buf.len() as u64).min(file.size - self.file_offset);

        // Where the file starts within the dataset's virtual stream.
        let dataset_file_offset: u64 = self.dataset.files[..self.file_index]
            .iter()
            .map(|f| f.size)
            .sum();

        let read_offset = dataset_file_offset + self.file_offset;
        let starting_block = read_offset / block_size;
        // A range that starts mid-block can touch one block more than its
        // length alone suggests; count from its last byte, not its size.
        let ending_block = (read_offset + num_bytes_to_read - 1) / block_size;
        let mut block_offset = read_offset % block_size;

        let mut bytes_read = 0usize;
        for index in starting_block..=ending_block {
            let signature = &self.dataset.blocks[index as usize];
            let size = block_size.min(num_bytes_to_read - bytes_read as u64);

            let mut parts = self
                .blocks
                .get_range(signature, block_offset, size)
                .await
                .map_err(|err| translate_read_error(err, signature))?;

            while let Some(part) = parts.recv().await {
                let part = part.map_err(|err| translate_read_error(err, signature))?;
                let take = part.len().min(buf.len() - bytes_read);
                buf[bytes_read..bytes_read + take].copy_from_slice(&part[..take]);
                bytes_read += take;
            }

            // Every subsequent block is read from its start.
            block_offset = 0;
        }

        self.file_offset += bytes_read as u64;
        Ok(bytes_read)
    }

    /// Read from the cursor to the end of the file.
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>, EngineError> {
        let remaining = self.size().saturating_sub(self.file_offset) as usize;
        let mut out = vec![0u8; remaining];

        let mut filled = 0usize;
        while filled < remaining {
            let n = self.read(&mut out[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        out.truncate(filled);
        Ok(out)
    }
}
