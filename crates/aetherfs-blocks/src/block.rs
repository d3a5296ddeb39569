//! Transient blocks and the file segments that back them.

use std::path::PathBuf;

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

use crate::error::BlockError;

/// A byte range within a local file, contributed to one block.
///
/// Segments are publish-time references only; they are never serialized
/// into the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSegment {
    /// Path of the backing file on the local disk.
    pub path: PathBuf,
    /// Byte offset into the backing file.
    pub offset: u64,
    /// Number of bytes this segment contributes.
    pub size: u64,
}

impl FileSegment {
    /// Read exactly this segment's bytes into `buf`.
    async fn read_into(&self, buf: &mut [u8]) -> Result<(), BlockError> {
        let mut file = fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.offset)).await?;

        let size = usize::try_from(self.size).expect("segment exceeds address space");
        file.read_exact(&mut buf[..size]).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                BlockError::SegmentTruncated {
                    path: self.path.display().to_string(),
                    offset: self.offset,
                    size: self.size,
                }
            } else {
                BlockError::Io(err)
            }
        })?;

        Ok(())
    }
}

/// An ordered run of file segments adding up to at most one block size.
///
/// Sealed by the segmenter once `size` reaches the block size, or left short
/// as the final block of a dataset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Block {
    /// Segments in stream order.
    pub segments: Vec<FileSegment>,
    /// Total bytes across all segments.
    pub size: u64,
}

impl Block {
    /// Materialize the block by reading every segment, in order, into `buf`.
    ///
    /// Returns the number of bytes written (`self.size`). The buffer must be
    /// at least `self.size` bytes; reusing one buffer across blocks bounds
    /// publish memory to a single block.
    pub async fn read_into(&self, buf: &mut [u8]) -> Result<usize, BlockError> {
        if (buf.len() as u64) < self.size {
            return Err(BlockError::BufferTooSmall {
                block: self.size,
                buffer: buf.len(),
            });
        }

        let mut filled = 0usize;
        for segment in &self.segments {
            let size = usize::try_from(segment.size).expect("segment exceeds address space");
            segment.read_into(&mut buf[filled..filled + size]).await?;
            filled += size;
        }

        Ok(filled)
    }
}
