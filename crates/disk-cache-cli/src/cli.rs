//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "disk-cache", version, about = "Store and fetch blobs in an on-disk cache")]
pub struct Cli {
    /// Root directory holding every cache space
    #[arg(long, env = "DISK_CACHE_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Cache space to operate on; omit to use the root directly
    #[arg(long, global = true)]
    pub space: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a blob under a key, read from a file or stdin
    Put {
        key: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Write the blob stored under a key to a file or stdout
    Get {
        key: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remove the entry for a key
    Rm { key: String },
    /// Remove every entry in the cache space
    Clear,
    /// Print the total size of the cache space in bytes
    Size,
    /// Print the file path a key is stored at
    Path { key: String },
    /// Print cache statistics as JSON
    Stats,
}
