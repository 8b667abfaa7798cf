//! disk-cache - command-line access to disk-cache spaces
//!
//! Stores, fetches and removes blobs in a cache space and reports its size.

mod cli;
mod commands;
mod error;

use crate::cli::Cli;
use crate::error::Result;
use clap::Parser;
use disk_cache::{DiskCache, DiskCacheConfig};
use tracing::debug;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout carries command output, so logs go to stderr
    let env_filter = EnvFilter::from_default_env().add_directive("disk_cache=warn".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    };

    let mut config = DiskCacheConfig::from_env();
    if let Some(root) = cli.root {
        config.root_dir = root;
    }
    // A one-shot process gains nothing from the memory mirror
    config.memory_capacity_bytes = 0;
    debug!(root = ?config.root_dir, space = ?cli.space, "Opening cache");

    let cache = DiskCache::from_config(&config, cli.space.as_deref())?;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    commands::execute(&cache, cli.command, stdin.lock(), &mut stdout).await
}
