//! Path routing over the dataset namespace.
//!
//! Addresses follow `/[@scope/]dataset[/tag[/filePath]]`. Opening a path
//! yields a [`Node`]; exposure surfaces dispatch on the variant instead of
//! probing structural capabilities.

use std::sync::Arc;

use aetherfs_store::{BlockStore, DatasetCatalog};
use aetherfs_types::{Dataset, Tag};
use tracing::debug;

use crate::error::EngineError;
use crate::namespace::{DirEntry, project};
use crate::reader::DatasetReader;

/// What an address resolves to.
pub enum Node {
    /// The dataset level: names visible under an optional scope.
    DatasetList {
        /// The scope already consumed by the path (empty at the root).
        prefix: String,
        /// Full dataset names, scope included.
        datasets: Vec<String>,
    },
    /// The tag level of one dataset.
    TagList {
        /// Full dataset name.
        dataset: String,
        /// Published tags.
        tags: Vec<Tag>,
    },
    /// A directory level inside a tagged dataset's file tree.
    Directory {
        /// The resolved dataset.
        dataset: Arc<Dataset>,
        /// The file-path prefix already consumed.
        path: String,
    },
    /// A regular file inside a tagged dataset.
    File {
        /// Dataset-relative file path.
        path: String,
        /// Reader positioned at offset 0.
        reader: DatasetReader,
    },
}

impl Node {
    /// List this node's directory entries.
    ///
    /// Files do not have entries; callers that reached a [`Node::File`]
    /// wanted [`into_reader`](Node::into_reader).
    pub fn entries(&self) -> Result<Vec<DirEntry>, EngineError> {
        match self {
            Node::DatasetList { prefix, datasets } => Ok(project(
                datasets.iter().map(String::as_str),
                prefix,
            )
            .into_iter()
            .map(|p| DirEntry::directory(p.name))
            .collect()),

            Node::TagList { tags, .. } => Ok(tags
                .iter()
                .map(|tag| DirEntry::directory(tag.version.clone()))
                .collect()),

            Node::Directory { dataset, path } => {
                let names = dataset.files.iter().map(|f| f.name.as_str());
                Ok(project(names, path)
                    .into_iter()
                    .map(|p| {
                        if !p.is_leaf {
                            return DirEntry::directory(p.name);
                        }

                        let full = if path.is_empty() {
                            p.name.clone()
                        } else {
                            format!("{path}/{}", p.name)
                        };
                        match dataset.file(&full) {
                            Some(file) => DirEntry::file(p.name, file.size, file.last_modified),
                            None => DirEntry::directory(p.name),
                        }
                    })
                    .collect())
            }

            Node::File { .. } => Err(EngineError::NotADirectory),
        }
    }

    /// Consume the node, returning its reader.
    ///
    /// Only files can be read; every other variant is a listing.
    pub fn into_reader(self) -> Result<DatasetReader, EngineError> {
        match self {
            Node::File { reader, .. } => Ok(reader),
            _ => Err(EngineError::NotAFile),
        }
    }

    /// True for [`Node::File`].
    pub fn is_file(&self) -> bool {
        matches!(self, Node::File { .. })
    }
}

/// The virtual file system every exposure surface serves.
///
/// Holds the two collaborators and nothing else; all state lives in the
/// nodes it hands out.
pub struct VirtualFs {
    blocks: Arc<dyn BlockStore>,
    datasets: Arc<dyn DatasetCatalog>,
}

impl VirtualFs {
    /// Create a virtual file system over the given collaborators.
    pub fn new(blocks: Arc<dyn BlockStore>, datasets: Arc<dyn DatasetCatalog>) -> Self {
        Self { blocks, datasets }
    }

    /// Resolve an address of the form `/[@scope/]dataset[/tag[/filePath]]`.
    pub async fn open(&self, path: &str) -> Result<Node, EngineError> {
        let trimmed = path.trim_start_matches('/');
        debug!(path, "open");

        // A leading `@` segment is the scope; otherwise the scope is empty.
        let mut parts: Vec<&str> = if trimmed.starts_with('@') {
            trimmed.splitn(4, '/').collect()
        } else {
            let mut parts = vec![""];
            parts.extend(trimmed.splitn(3, '/'));
            parts
        };
        parts.resize(4, "");

        // A more specific part may only be set when every less specific
        // part is: no file path without a tag, no tag without a dataset.
        let mut provided = false;
        for part in parts[1..].iter().rev() {
            if provided && part.is_empty() {
                return Err(EngineError::InvalidPath(path.to_string()));
            }
            provided = provided || !part.is_empty();
        }

        let (scope, dataset, tag, file_path) = (parts[0], parts[1], parts[2], parts[3]);

        if dataset.is_empty() {
            return self.open_dataset_list(scope).await;
        }

        let full_name = if scope.is_empty() {
            dataset.to_string()
        } else {
            format!("{scope}/{dataset}")
        };

        if tag.is_empty() {
            return self.open_tag_list(full_name).await;
        }

        self.open_dataset_entry(full_name, tag, file_path.trim_end_matches('/'))
            .await
    }

    async fn open_dataset_list(&self, scope: &str) -> Result<Node, EngineError> {
        let scope_filter = (!scope.is_empty()).then_some(scope);
        let datasets = self.datasets.list_datasets(scope_filter).await?;

        if !scope.is_empty() && datasets.is_empty() {
            return Err(EngineError::NotFound(scope.to_string()));
        }

        Ok(Node::DatasetList {
            prefix: scope.to_string(),
            datasets,
        })
    }

    async fn open_tag_list(&self, dataset: String) -> Result<Node, EngineError> {
        let tags = self.datasets.list_tags(&dataset).await?;

        // A dataset with no published tags is indistinguishable from one
        // that never existed.
        if tags.is_empty() {
            return Err(EngineError::NotFound(dataset));
        }

        Ok(Node::TagList { dataset, tags })
    }

    async fn open_dataset_entry(
        &self,
        dataset_name: String,
        version: &str,
        file_path: &str,
    ) -> Result<Node, EngineError> {
        let tag = Tag {
            host: String::new(),
            dataset: dataset_name,
            version: version.to_string(),
        };
        let dataset = Arc::new(self.datasets.lookup(&tag).await?);

        if let Some(index) = dataset.files.iter().position(|f| f.name == file_path) {
            let reader = DatasetReader::new(Arc::clone(&dataset), Arc::clone(&self.blocks), index);
            return Ok(Node::File {
                path: file_path.to_string(),
                reader,
            });
        }

        // The dataset root always exists; deeper prefixes only if something
        // lives under them.
        if file_path.is_empty()
            || !project(dataset.files.iter().map(|f| f.name.as_str()), file_path).is_empty()
        {
            return Ok(Node::Directory {
                dataset,
                path: file_path.to_string(),
            });
        }

        Err(EngineError::NotFound(file_path.to_string()))
    }
}
