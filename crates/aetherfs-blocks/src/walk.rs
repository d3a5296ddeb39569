//! Stable-order discovery of regular files under a publish root.

use std::path::Path;
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::error::BlockError;
use crate::segmenter::SourceFile;

/// Walk `root` and return its regular files in a stable order.
///
/// Entries are sorted by file name at every directory level, so the same
/// tree always yields the same sequence — and therefore the same blocks and
/// signatures. Symlinks and other non-regular files are skipped. Names are
/// `/`-separated paths relative to `root`.
pub fn scan_tree(root: impl AsRef<Path>) -> Result<Vec<SourceFile>, BlockError> {
    let root = root.as_ref();
    let mut sources = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| BlockError::Io(err.into()))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata().map_err(|err| BlockError::Io(err.into()))?;
        let last_modified = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let name = entry
            .path()
            .strip_prefix(root)
            .expect("walk entries live under the root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        sources.push(SourceFile {
            path: entry.path().to_path_buf(),
            name,
            size: metadata.len(),
            last_modified,
        });
    }

    Ok(sources)
}
