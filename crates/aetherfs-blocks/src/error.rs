//! Error types for block construction.

/// Errors that can occur while segmenting, materializing, or addressing
/// blocks.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// The configured block size is zero.
    #[error("block size must be greater than zero")]
    InvalidBlockSize,

    /// An accumulator grew past the block size. Internal invariant violation.
    #[error("block overflow: accumulated {accumulated} bytes with block size {block_size}")]
    Overflow {
        /// Bytes accumulated when the overflow was detected.
        accumulated: u64,
        /// The configured block size.
        block_size: u64,
    },

    /// The destination buffer cannot hold the block.
    #[error("insufficient buffer: block is {block} bytes, buffer holds {buffer}")]
    BufferTooSmall {
        /// Size of the block being materialized.
        block: u64,
        /// Capacity of the destination buffer.
        buffer: usize,
    },

    /// A source file no longer contains the bytes a segment refers to.
    #[error("segment truncated: {path} ended before offset {offset} + {size}")]
    SegmentTruncated {
        /// Path of the file backing the segment.
        path: String,
        /// Segment offset into the file.
        offset: u64,
        /// Segment length.
        size: u64,
    },

    /// The requested hash algorithm is not supported.
    #[error("unrecognized algorithm: {0}")]
    UnknownAlgorithm(String),

    /// An I/O error while reading source files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
