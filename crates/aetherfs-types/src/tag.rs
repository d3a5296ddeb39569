//! Human-readable dataset references.
//!
//! A tag address has the form `[host/][@scope/]name[:version]`. The version
//! defaults to `latest` and the host to [`DEFAULT_HOST`] (callers with a
//! configured endpoint use [`Tag::parse`] instead of [`FromStr`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Endpoint assumed when an address omits the host part.
pub const DEFAULT_HOST: &str = "localhost:8080";

/// Errors produced while parsing a tag address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagParseError {
    /// The address contains more than three `/`-separated segments.
    #[error("too many parts to path")]
    TooManyPathParts,

    /// The `name:version` portion contains more than one `:`.
    #[error("too many parts")]
    TooManyParts,
}

/// A mutable pointer to a dataset: `host`, dataset name (optionally
/// `@scope/name`), and version.
///
/// Publishing a tag is the only mutation in the system; at any moment a tag
/// resolves to exactly one [`Dataset`](crate::Dataset).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Endpoint the dataset lives on.
    pub host: String,
    /// Dataset name, including the `@scope/` prefix when scoped.
    pub dataset: String,
    /// Version label, `latest` when unspecified.
    pub version: String,
}

/// Split the `name[:version]` portion of an address.
fn split_dataset_version(input: &str) -> Result<(String, String), TagParseError> {
    let parts: Vec<&str> = input.split(':').collect();

    match parts.len() {
        1 => Ok((parts[0].to_string(), "latest".to_string())),
        2 => Ok((parts[0].to_string(), parts[1].to_string())),
        _ => Err(TagParseError::TooManyParts),
    }
}

impl Tag {
    /// Parse an address, filling in `default_host` when the host is omitted.
    ///
    /// Three `/`-separated segments are `host/@scope/name`; two segments are
    /// `host/name` unless the first is `@`-prefixed, in which case the whole
    /// address is a scoped name. More than three segments is an error.
    pub fn parse(input: &str, default_host: &str) -> Result<Self, TagParseError> {
        let parts: Vec<&str> = input.split('/').collect();

        let (host, remainder) = match parts.len() {
            0..=1 => (default_host.to_string(), input.to_string()),
            2 if !parts[0].starts_with('@') => (parts[0].to_string(), parts[1].to_string()),
            2 => (default_host.to_string(), input.to_string()),
            3 => (parts[0].to_string(), parts[1..].join("/")),
            _ => return Err(TagParseError::TooManyPathParts),
        };

        let (dataset, version) = split_dataset_version(&remainder)?;

        Ok(Self {
            host,
            dataset,
            version,
        })
    }
}

impl FromStr for Tag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, DEFAULT_HOST)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.host.is_empty() {
            write!(f, "{}/", self.host)?;
        }

        f.write_str(&self.dataset)?;

        if !self.version.is_empty() {
            write!(f, ":{}", self.version)?;
        }

        Ok(())
    }
}
