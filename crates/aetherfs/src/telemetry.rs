//! Tracing initialization for the CLI.

use tracing_subscriber::EnvFilter;

/// Initialize the console tracing subscriber.
///
/// Call once at startup, before any `tracing` events are emitted. The
/// `RUST_LOG` environment variable overrides the configured level.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
