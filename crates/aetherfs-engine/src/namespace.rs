//! One-level projection of flat name lists into directory listings.

use std::collections::HashSet;

/// A name projected into one directory level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projected {
    /// Entry name: the remainder for leaves, the first remaining segment
    /// for synthetic directories.
    pub name: String,
    /// True when the candidate had no `/` left after the prefix.
    pub is_leaf: bool,
}

/// Project flat `/`-separated names into the directory level under `prefix`.
///
/// Candidates that don't live under the prefix are skipped. For the rest,
/// the prefix and one leading `/` are stripped; what remains is either a
/// leaf (no `/` left) or a deeper path whose first segment becomes a
/// synthetic directory entry. Synthetic directories are emitted once,
/// in first-seen order.
pub fn project<'a>(names: impl IntoIterator<Item = &'a str>, prefix: &str) -> Vec<Projected> {
    // Anchor the prefix at a segment boundary so "a" never captures "ab.csv".
    let prefix = match prefix.trim_end_matches('/') {
        "" => String::new(),
        trimmed => format!("{trimmed}/"),
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();

    for name in names {
        let Some(remaining) = name.strip_prefix(&prefix) else {
            continue;
        };
        let remaining = remaining.strip_prefix('/').unwrap_or(remaining);
        if remaining.is_empty() {
            continue;
        }

        match remaining.split_once('/') {
            None => entries.push(Projected {
                name: remaining.to_string(),
                is_leaf: true,
            }),
            Some((first, _rest)) => {
                if seen.insert(first.to_string()) {
                    entries.push(Projected {
                        name: first.to_string(),
                        is_leaf: false,
                    });
                }
            }
        }
    }

    entries
}

/// What a directory entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file within a dataset.
    File,
    /// A directory: a scope, dataset, tag, or file-path segment.
    Directory,
}

/// One entry in a projected directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name within its directory.
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Size in bytes; zero for directories.
    pub size: u64,
    /// Unix timestamp (seconds); zero for directories.
    pub last_modified: u64,
}

impl DirEntry {
    /// A synthetic directory entry.
    pub(crate) fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
            last_modified: 0,
        }
    }

    /// A file entry carrying its metadata.
    pub(crate) fn file(name: impl Into<String>, size: u64, last_modified: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            last_modified,
        }
    }
}
