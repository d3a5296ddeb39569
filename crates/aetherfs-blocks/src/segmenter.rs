//! Fixed-size segmentation of a file tree into blocks.

use std::path::PathBuf;

use aetherfs_types::File;

use crate::block::{Block, FileSegment};
use crate::error::BlockError;

/// A regular file discovered under the publish root, in stable walk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on the local disk.
    pub path: PathBuf,
    /// `/`-separated path relative to the publish root.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Unix timestamp (seconds) of the last modification.
    pub last_modified: u64,
}

/// The result of segmenting a file tree: the dataset's file list and the
/// ordered blocks that cover it.
///
/// Concatenating the block bytes in order reproduces the concatenation of
/// the file bytes in order.
#[derive(Debug)]
pub struct Segmentation {
    /// The block size the tree was packed with.
    pub block_size: u32,
    /// Files in walk order.
    pub files: Vec<File>,
    /// Blocks in stream order. Every block is full except possibly the last.
    pub blocks: Vec<Block>,
}

/// Packs an ordered sequence of files into fixed-size blocks.
///
/// Large files span multiple blocks; small files glob together into shared
/// blocks. The last block may be short.
pub struct Segmenter {
    block_size: u32,
}

impl Segmenter {
    /// Create a segmenter for the given block size in bytes.
    ///
    /// A zero block size is rejected here so the per-block arithmetic never
    /// has to guard against division by zero.
    pub fn new(block_size: u32) -> Result<Self, BlockError> {
        if block_size == 0 {
            return Err(BlockError::InvalidBlockSize);
        }

        Ok(Self { block_size })
    }

    /// Segment `sources` into blocks, preserving walk order.
    ///
    /// Zero-byte files contribute a [`File`] entry but no segments.
    pub fn segment(&self, sources: &[SourceFile]) -> Result<Segmentation, BlockError> {
        let block_size = u64::from(self.block_size);
        let mut out = Segmentation {
            block_size: self.block_size,
            files: Vec::new(),
            blocks: Vec::new(),
        };
        let mut current = Block::default();

        for source in sources {
            out.files.push(File {
                name: source.name.clone(),
                size: source.size,
                last_modified: source.last_modified,
            });

            let mut offset = 0u64;
            let mut remaining = source.size;

            while remaining > 0 {
                let take = remaining.min(block_size - current.size);

                current.segments.push(FileSegment {
                    path: source.path.clone(),
                    offset,
                    size: take,
                });
                current.size += take;

                offset += take;
                remaining -= take;

                if current.size > block_size {
                    return Err(BlockError::Overflow {
                        accumulated: current.size,
                        block_size,
                    });
                }

                if current.size == block_size {
                    out.blocks.push(std::mem::take(&mut current));
                }
            }
        }

        // Catch the partial trailing block.
        if current.size > 0 {
            out.blocks.push(current);
        }

        Ok(out)
    }
}
