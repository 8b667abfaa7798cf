//! On-disk key-value blob cache
//!
//! Stores byte blobs under string keys, one file per entry. File names are the
//! SHA-256 hex digest of the key, and each cache lives in its own "cache space"
//! subdirectory beneath a common root so independent caches never collide.
//!
//! Every operation comes in two forms: a blocking one that collapses failures
//! to `bool`/`Option`, and an `async` one that runs on the tokio blocking pool
//! and reports the underlying [`DiskCacheError`].

mod cache;
mod config;
mod error;
mod fs;
mod key;
mod memory;
mod types;

pub use cache::{DiskCache, DiskCacheBuilder, DEFAULT_CACHE_SPACE};
pub use config::DiskCacheConfig;
pub use error::{DiskCacheError, Result};
pub use fs::{Filesystem, LocalFilesystem};
pub use key::file_name_from_key;
pub use memory::{MemoryStore, MokaMemoryStore};
pub use types::CacheStats;
