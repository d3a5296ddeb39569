//! The AetherFS block engine.
//!
//! Everything byte-exact lives here, implemented once and delegated to by
//! every exposure surface:
//!
//! - [`Publisher`] — the dedup-aware streaming upload pipeline, with
//!   [`publish_all`] for concurrent multi-destination publishes.
//! - [`DatasetReader`] — random-access reconstruction of a virtual file
//!   from the dataset's ordered block list.
//! - [`VirtualFs`] / [`Node`] — path routing and one-level namespace
//!   projection over datasets, tags, and files.
//! - [`download`] — whole-dataset materialization with per-file fan-out.
//!
//! Adapters (HTTP, WebDAV, NFS, CLI) translate [`EngineError`] to their own
//! idiom exactly once via [`ErrorKind`]; none of them re-implement block
//! arithmetic.

mod download;
mod error;
mod namespace;
mod publisher;
mod reader;
mod vfs;

#[cfg(test)]
mod tests;

pub use download::download;
pub use error::{EngineError, ErrorKind};
pub use namespace::{DirEntry, EntryKind, Projected, project};
pub use publisher::{PublishFailure, PublishTarget, Publisher, publish_all};
pub use reader::DatasetReader;
pub use vfs::{Node, VirtualFs};
