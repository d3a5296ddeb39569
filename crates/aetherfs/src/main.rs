//! `aetherfs` — publish and consume versioned datasets.
//!
//! # Usage
//!
//! ```text
//! aetherfs push -t maxmind:v1 -t @geo/maxmind:v1 /tmp/maxmind
//! aetherfs pull /var/datasets maxmind:v1
//! aetherfs ls /maxmind/v1
//! aetherfs serve -l 127.0.0.1:8080
//! ```

mod config;
mod telemetry;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use aetherfs_blocks::{HashAlgorithm, Segmenter, scan_tree};
use aetherfs_engine::{EntryKind, Node, Publisher, VirtualFs, download};
use aetherfs_http::FileServer;
use aetherfs_store::{BlockStore, DatasetCatalog, DiskCatalog, FileBlockStore};
use aetherfs_types::Tag;
use clap::{Parser, Subcommand};
use tracing::info;

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "aetherfs",
    version,
    about = "A virtual file system for small to medium sized datasets"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push a dataset into the repository.
    Push {
        /// Name and tag of the dataset being pushed (`name[:version]`).
        /// Can be specified multiple times.
        #[arg(short, long = "tag", required = true)]
        tags: Vec<String>,

        /// Override the maximum bytes per block, in MiB.
        #[arg(long)]
        block_size_mib: Option<u32>,

        /// Directory to publish.
        path: PathBuf,
    },

    /// Pull datasets out of the repository onto the local disk.
    Pull {
        /// Directory to materialize datasets under.
        dest: PathBuf,

        /// Dataset addresses (`name[:version]`).
        #[arg(required = true)]
        datasets: Vec<String>,
    },

    /// List one level of the dataset namespace.
    Ls {
        /// Address to list (`/[@scope/]dataset[/tag[/path]]`).
        #[arg(default_value = "/")]
        path: String,
    },

    /// Serve the repository over HTTP.
    Serve {
        /// Override the listen address (e.g. "127.0.0.1:8080").
        #[arg(short = 'l', long)]
        listen_addr: Option<String>,
    },
}

// -----------------------------------------------------------------------
// Repository wiring
// -----------------------------------------------------------------------

/// The local repository: file-backed blocks plus the on-disk catalog.
struct Repository {
    blocks: Arc<dyn BlockStore>,
    datasets: Arc<dyn DatasetCatalog>,
}

impl Repository {
    fn open(config: &CliConfig) -> Result<Self> {
        let data_dir = &config.repository.data_dir;

        let blocks = FileBlockStore::new(data_dir.join("blocks"))
            .context("failed to open block store")?;
        let datasets =
            DiskCatalog::open(data_dir.join("catalog")).context("failed to open catalog")?;

        Ok(Self {
            blocks: Arc::new(blocks),
            datasets: Arc::new(datasets),
        })
    }
}

fn parse_tags(raw: &[String], default_host: &str) -> Result<Vec<Tag>> {
    raw.iter()
        .map(|s| {
            Tag::parse(s, default_host).with_context(|| format!("invalid tag address: {s}"))
        })
        .collect()
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

async fn run_push(
    config: &CliConfig,
    tags: Vec<String>,
    block_size_mib: Option<u32>,
    path: PathBuf,
) -> Result<()> {
    let tags = parse_tags(&tags, &config.server.default_host)?;
    let algorithm = HashAlgorithm::from_str(&config.publish.algorithm)?;

    // The local repository serves the default host. Publishing to another
    // host takes a remote block-store/catalog pair wired by the operator.
    if let Some(tag) = tags.iter().find(|t| t.host != config.server.default_host) {
        bail!("no transport configured for host {}", tag.host);
    }

    let block_size = block_size_mib
        .map(|mib| mib.saturating_mul(1024 * 1024))
        .unwrap_or_else(|| config.block_size());

    let root = path
        .canonicalize()
        .with_context(|| format!("no such directory: {}", path.display()))?;

    info!(root = %root.display(), block_size, "scanning");
    let sources = scan_tree(&root)?;
    if sources.is_empty() {
        bail!("nothing to publish under {}", root.display());
    }

    let layout = Segmenter::new(block_size)?.segment(&sources)?;

    let repository = Repository::open(config)?;
    let publisher = Publisher::with_algorithm(repository.blocks, repository.datasets, algorithm);
    let dataset = publisher.publish(&layout, &tags).await?;

    for tag in &tags {
        println!("published {tag}");
    }
    println!(
        "{} file(s), {} block(s), {} byte(s)",
        dataset.files.len(),
        dataset.blocks.len(),
        dataset.total_size()
    );

    Ok(())
}

async fn run_pull(config: &CliConfig, dest: PathBuf, addresses: Vec<String>) -> Result<()> {
    let tags = parse_tags(&addresses, &config.server.default_host)?;
    let repository = Repository::open(config)?;

    for tag in tags {
        let lookup = Tag {
            host: String::new(),
            ..tag.clone()
        };
        let dataset = Arc::new(repository.datasets.lookup(&lookup).await?);

        // Each dataset lands under dest/<dataset>/<version>.
        let mut target = dest.clone();
        for segment in tag.dataset.split('/') {
            target.push(segment);
        }
        target.push(&tag.version);

        info!(%tag, dest = %target.display(), "pulling dataset");
        download(dataset, Arc::clone(&repository.blocks), &target).await?;
        println!("pulled {tag} -> {}", target.display());
    }

    Ok(())
}

async fn run_ls(config: &CliConfig, path: String) -> Result<()> {
    let repository = Repository::open(config)?;
    let vfs = VirtualFs::new(repository.blocks, repository.datasets);

    let node = vfs.open(&path).await?;

    match &node {
        Node::File { path, reader } => {
            let file = reader.file();
            println!("{:>12}  {}", file.size, path);
        }
        _ => {
            for entry in node.entries()? {
                match entry.kind {
                    EntryKind::Directory => println!("{:>12}  {}/", "-", entry.name),
                    EntryKind::File => println!("{:>12}  {}", entry.size, entry.name),
                }
            }
        }
    }

    Ok(())
}

async fn run_serve(config: &CliConfig, listen_addr: Option<String>) -> Result<()> {
    let addr = listen_addr.unwrap_or_else(|| config.server.listen_addr.clone());

    let repository = Repository::open(config)?;
    let vfs = Arc::new(VirtualFs::new(repository.blocks, repository.datasets));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "serving datasets over http");
    FileServer::new(vfs).serve(listener).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    telemetry::init(&config.log.level);

    match cli.command {
        Commands::Push {
            tags,
            block_size_mib,
            path,
        } => run_push(&config, tags, block_size_mib, path).await,
        Commands::Pull { dest, datasets } => run_pull(&config, dest, datasets).await,
        Commands::Ls { path } => run_ls(&config, path).await,
        Commands::Serve { listen_addr } => run_serve(&config, listen_addr).await,
    }
}
