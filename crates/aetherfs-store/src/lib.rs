//! Block-store and dataset-catalog collaborators for AetherFS.
//!
//! This crate defines the two seams the block engine talks through:
//!
//! - [`BlockStore`] — content-addressed block persistence with streaming
//!   uploads and ranged streaming downloads.
//! - [`DatasetCatalog`] — dataset metadata and tag resolution.
//!
//! Local backends are provided for both: [`MemoryBlockStore`] and
//! [`MemoryCatalog`] for tests and memory-only operation, [`FileBlockStore`]
//! with a fan-out directory layout, and the fjall-backed [`DiskCatalog`].
//! Remote backends (object stores, hub proxies) implement the same traits
//! elsewhere.

mod catalog;
mod error;
mod file_store;
mod memory;
mod traits;

pub use catalog::DiskCatalog;
pub use error::{CatalogError, StoreError};
pub use file_store::FileBlockStore;
pub use memory::{MemoryBlockStore, MemoryCatalog};
pub use traits::{BlockStore, DatasetCatalog, PartReceiver, PartSender, RangeStream, part_channel};
