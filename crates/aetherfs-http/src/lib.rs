//! HTTP file-server surface for AetherFS.
//!
//! Exposes the dataset namespace over plain HTTP:
//!
//! - `GET /` — list datasets (optionally `GET /@scope`)
//! - `GET /{dataset}` — list published tags
//! - `GET /{dataset}/{tag}[/path]` — list a directory level, or fetch a
//!   file's bytes (single `Range: bytes=a-b` requests supported)
//!
//! The surface is a thin translation: path routing, listings, and every
//! byte of block arithmetic are delegated to
//! [`VirtualFs`](aetherfs_engine::VirtualFs) and
//! [`DatasetReader`](aetherfs_engine::DatasetReader). Errors map to status
//! codes in exactly one place ([`ApiError`]).

mod error;
mod handlers;


use std::sync::Arc;

use aetherfs_engine::VirtualFs;
use axum::Router;
use axum::routing::get;

pub use error::ApiError;

/// Shared state for all handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// The virtual file system being served.
    pub vfs: Arc<VirtualFs>,
}

/// The HTTP file server.
pub struct FileServer {
    vfs: Arc<VirtualFs>,
}

impl FileServer {
    /// Create a file server over the given virtual file system.
    pub fn new(vfs: Arc<VirtualFs>) -> Self {
        Self { vfs }
    }

    /// Build the axum router.
    pub fn into_router(self) -> Router {
        let state = AppState { vfs: self.vfs };

        Router::new()
            .route("/", get(handlers::open_path))
            .route("/{*path}", get(handlers::open_path))
            .with_state(state)
    }

    /// Serve requests on the given listener until the task is cancelled.
    pub async fn serve(self, listener: tokio::net::TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.into_router()).await
    }
}
