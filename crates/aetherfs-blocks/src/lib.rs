//! Block construction and content addressing for AetherFS.
//!
//! This crate covers the publish-time half of the block engine:
//!
//! - [`Segmenter`] — packs an ordered file tree into fixed-size blocks.
//! - [`Block`] / [`FileSegment`] — byte-range references into local files,
//!   materialized into a caller-provided buffer.
//! - [`compute_signature`] — deterministic content address of a block's bytes.
//! - [`scan_tree`] — stable-order walk of a directory tree.
//!
//! Blocks are transient: they exist only while publishing. Once uploaded,
//! a block is referenced exclusively by its [`Signature`](aetherfs_types::Signature).

mod block;
mod error;
mod segmenter;
mod signature;
mod walk;

pub use block::{Block, FileSegment};
pub use error::BlockError;
pub use segmenter::{Segmentation, Segmenter, SourceFile};
pub use signature::{HashAlgorithm, compute_signature};
pub use walk::scan_tree;
