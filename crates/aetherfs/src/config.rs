//! TOML configuration for the AetherFS CLI.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Local repository location.
    pub repository: RepositorySection,
    /// File-server settings.
    pub server: ServerSection,
    /// Publish-side tuning.
    pub publish: PublishSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[repository]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RepositorySection {
    /// Directory holding blocks and the dataset catalog.
    pub data_dir: PathBuf,
}

impl Default for RepositorySection {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .map(|h| h.join(".aetherfs"))
            .unwrap_or_else(|| PathBuf::from(".aetherfs"));
        Self { data_dir }
    }
}

/// `[server]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address for the HTTP file server.
    pub listen_addr: String,
    /// Host assumed when a tag address omits one.
    pub default_host: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            default_host: aetherfs_types::DEFAULT_HOST.to_string(),
        }
    }
}

/// `[publish]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublishSection {
    /// Maximum bytes per block, in MiB.
    pub block_size_mib: u32,
    /// Signature algorithm: `"sha256"` (default) or `"sha512"`.
    pub algorithm: String,
}

impl Default for PublishSection {
    fn default() -> Self {
        Self {
            block_size_mib: 256,
            algorithm: "sha256".to_string(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file, or defaults when `path` is
    /// `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Block size in bytes.
    pub fn block_size(&self) -> u32 {
        self.publish.block_size_mib.saturating_mul(1024 * 1024)
    }
}
