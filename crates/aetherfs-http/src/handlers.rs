//! Request handlers for the file-server surface.

use std::io::SeekFrom;

use aetherfs_engine::{DatasetReader, DirEntry, EntryKind, Node};
use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Response, StatusCode, Uri, header};
use axum::response::IntoResponse;
use serde::Serialize;
use tracing::debug;

use crate::AppState;
use crate::error::ApiError;

/// One listing entry on the wire.
#[derive(Serialize)]
pub(crate) struct EntryJson {
    name: String,
    kind: &'static str,
    size: u64,
    last_modified: u64,
}

impl From<DirEntry> for EntryJson {
    fn from(entry: DirEntry) -> Self {
        Self {
            name: entry.name,
            kind: match entry.kind {
                EntryKind::File => "file",
                EntryKind::Directory => "directory",
            },
            size: entry.size,
            last_modified: entry.last_modified,
        }
    }
}

/// `GET /{*path}` — list a namespace level or fetch file bytes.
pub(crate) async fn open_path(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    let path = uri.path();
    debug!(path, "open");

    let node = state.vfs.open(path).await?;

    if node.is_file() {
        let reader = node.into_reader()?;
        return serve_file(reader, &headers).await;
    }

    let entries: Vec<EntryJson> = node.entries()?.into_iter().map(EntryJson::from).collect();
    Ok(Json(entries).into_response())
}

/// Serve a file's bytes, honoring a single-range `Range` header.
async fn serve_file(
    mut reader: DatasetReader,
    headers: &HeaderMap,
) -> Result<Response<Body>, ApiError> {
    let size = reader.size();

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range);

    let (status, start, end) = match range {
        Some((start, requested_end)) => {
            if start >= size {
                let response = Response::builder()
                    .status(StatusCode::RANGE_NOT_SATISFIABLE)
                    .header(header::CONTENT_RANGE, format!("bytes */{size}"))
                    .body(Body::empty())
                    .expect("static response");
                return Ok(response);
            }

            let end = requested_end.map_or(size, |e| e.saturating_add(1).min(size));
            (StatusCode::PARTIAL_CONTENT, start, end)
        }
        None => (StatusCode::OK, 0, size),
    };

    reader.seek(SeekFrom::Start(start)).map_err(ApiError)?;

    let mut body = vec![0u8; end.saturating_sub(start) as usize];
    let mut filled = 0usize;
    while filled < body.len() {
        let n = reader.read(&mut body[filled..]).await.map_err(ApiError)?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    body.truncate(filled);

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_LENGTH, body.len())
        .header(header::ACCEPT_RANGES, "bytes");

    if status == StatusCode::PARTIAL_CONTENT {
        response = response.header(
            header::CONTENT_RANGE,
            format!("bytes {start}-{}/{size}", start + body.len() as u64 - 1),
        );
    }

    Ok(response
        .body(Body::from(body))
        .expect("response construction cannot fail"))
}

/// Parse a single-range `Range` header value: `bytes=a-b` or `bytes=a-`.
///
/// Suffix ranges and multi-range requests are not supported; the caller
/// falls back to a full-body response.
fn parse_range(value: &str) -> Option<(u64, Option<u64>)> {
    let spec = value.strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }

    let (start, end) = spec.split_once('-')?;
    let start: u64 = start.parse().ok()?;

    let end = if end.is_empty() {
        None
    } else {
        Some(end.parse().ok()?)
    };

    if let Some(end) = end {
        if end < start {
            return None;
        }
    }

    Some((start, end))
}
