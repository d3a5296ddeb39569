//! Shared types for AetherFS.
//!
//! This crate defines the data model used across the AetherFS workspace:
//! the immutable [`Dataset`] snapshot with its [`File`] list and ordered
//! [`Signature`] list, the mutable [`Tag`] pointer with its address parser,
//! and the wire constants shared by the upload and download paths.

mod dataset;
mod tag;

pub use dataset::{Dataset, File, Signature};
pub use tag::{Tag, TagParseError, DEFAULT_HOST};

/// Number of bytes in a kibibyte.
pub const KIBIBYTE: u64 = 1024;

/// Number of bytes in a mebibyte.
pub const MEBIBYTE: u64 = 1024 * KIBIBYTE;

/// Length of a single part when streaming a block over the wire.
///
/// Uploads and downloads move block bytes in parts of this size so no
/// layer ever needs to hold more than one block in memory.
pub const PART_SIZE: u64 = 64 * KIBIBYTE;
