//! Dataset snapshots and block signatures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content address of a single block: the lowercase base32 digest of its
/// bytes.
///
/// Identical bytes always produce the same signature, regardless of which
/// dataset or file they came from, so the signature doubles as the dedup key
/// and the storage key.
#[derive(Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Signature(String);

impl Signature {
    /// Wrap an already-computed digest string.
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Return the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.0)
    }
}

/// A single file within a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// `/`-separated path relative to the dataset root.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Unix timestamp (seconds) of the last modification.
    pub last_modified: u64,
}

/// An immutable snapshot of a file tree.
///
/// The concatenation of all files' bytes, in list order, equals the
/// concatenation of all blocks' bytes, in list order. Every block is
/// `block_size` bytes except possibly the last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Bytes per block.
    pub block_size: u32,
    /// Files in walk order.
    pub files: Vec<File>,
    /// Block signatures in stream order.
    pub blocks: Vec<Signature>,
}

impl Dataset {
    /// Total size of the dataset in bytes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Find a file by its dataset-relative name.
    pub fn file(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Byte offset of the named file within the virtual concatenated stream.
    ///
    /// Returns the sum of the sizes of all files preceding it in list order,
    /// or `None` if the file is not part of the dataset.
    pub fn file_offset(&self, name: &str) -> Option<u64> {
        let mut offset = 0u64;
        for file in &self.files {
            if file.name == name {
                return Some(offset);
            }
            offset += file.size;
        }
        None
    }
}
