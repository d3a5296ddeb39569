//! [`DiskCatalog`] — dataset metadata persisted in fjall keyspaces.

use std::collections::BTreeSet;
use std::path::Path;

use aetherfs_types::{Dataset, Tag};
use tracing::debug;

use crate::error::CatalogError;
use crate::traits::{DatasetCatalog, validate_tags};

use fjall::{Database, Keyspace, KeyspaceCreateOptions};

type Result<T> = std::result::Result<T, CatalogError>;

/// Storage key for one published tag: `name:version`.
///
/// Neither a dataset name nor a version can contain `:` (the tag grammar
/// would have split it), so the last `:` in a key always separates the two.
fn tag_key(dataset: &str, version: &str) -> String {
    format!("{dataset}:{version}")
}

/// Dataset catalog backed by fjall.
///
/// One keyspace maps `name:version` keys to postcard-encoded [`Dataset`]
/// values. Listing operations are prefix scans over the same keyspace.
pub struct DiskCatalog {
    /// The underlying fjall database handle.
    #[allow(dead_code)]
    db: Database,
    /// `name:version` → serialized Dataset.
    datasets: Keyspace,
}

impl DiskCatalog {
    /// Open a persistent catalog at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(path).open()?;
        Self::init_keyspaces(db)
    }

    /// Open a temporary catalog that is cleaned up on drop.
    ///
    /// Useful for tests.
    pub fn open_temporary() -> Result<Self> {
        let tmp = tempfile::tempdir().map_err(std::io::Error::other)?;
        let db = Database::builder(tmp.path()).temporary(true).open()?;
        Self::init_keyspaces(db)
    }

    fn init_keyspaces(db: Database) -> Result<Self> {
        let datasets = db.keyspace("datasets", KeyspaceCreateOptions::default)?;
        Ok(Self { db, datasets })
    }
}

#[async_trait::async_trait]
impl DatasetCatalog for DiskCatalog {
    async fn list_datasets(&self, scope: Option<&str>) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();

        for guard in self.datasets.iter() {
            let key = guard.key()?;
            let key = std::str::from_utf8(&key).unwrap_or_default();
            if let Some((name, _version)) = key.rsplit_once(':') {
                names.insert(name.to_string());
            }
        }

        let mut names: Vec<String> = names.into_iter().collect();
        if let Some(scope) = scope {
            let prefix = format!("{scope}/");
            names.retain(|name| name.starts_with(&prefix));
        }

        Ok(names)
    }

    async fn list_tags(&self, dataset: &str) -> Result<Vec<Tag>> {
        let prefix = tag_key(dataset, "");

        let mut tags = Vec::new();
        for guard in self.datasets.prefix(prefix.as_bytes()) {
            let key = guard.key()?;
            let key = std::str::from_utf8(&key).unwrap_or_default();
            if let Some((name, version)) = key.rsplit_once(':') {
                tags.push(Tag {
                    host: String::new(),
                    dataset: name.to_string(),
                    version: version.to_string(),
                });
            }
        }

        Ok(tags)
    }

    async fn lookup(&self, tag: &Tag) -> Result<Dataset> {
        let key = tag_key(&tag.dataset, &tag.version);

        match self.datasets.get(key.as_bytes())? {
            Some(bytes) => Ok(postcard::from_bytes(&bytes)?),
            None => Err(CatalogError::NotFound(tag.clone())),
        }
    }

    async fn publish(&self, dataset: &Dataset, tags: &[Tag]) -> Result<()> {
        validate_tags(tags)?;

        let value = postcard::to_allocvec(dataset)?;
        for tag in tags {
            let key = tag_key(&tag.dataset, &tag.version);
            self.datasets.insert(key.as_bytes(), value.as_slice())?;
            debug!(%tag, blocks = dataset.blocks.len(), "published dataset");
        }

        Ok(())
    }
}
