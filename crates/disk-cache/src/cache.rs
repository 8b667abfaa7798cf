//! File-based blob cache partitioned into cache spaces

use crate::config::DiskCacheConfig;
use crate::error::{DiskCacheError, Result};
use crate::fs::{Filesystem, LocalFilesystem, TEMP_PREFIX};
use crate::key::file_name_from_key;
use crate::memory::{MemoryStore, MokaMemoryStore};
use crate::types::CacheStats;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info, warn};

/// Cache space used by [`DiskCache::shared_instance`]
pub const DEFAULT_CACHE_SPACE: &str = "Default";

static SHARED: OnceLock<DiskCache> = OnceLock::new();
static SHARED_INIT: Mutex<()> = Mutex::new(());

/// A blob cache storing one file per key under `root/<cache space>`
///
/// Cloning is cheap and clones share the filesystem, memory store and
/// hit/miss counters. Concurrent operations on the same key are not ordered:
/// the last writer wins.
#[derive(Clone)]
pub struct DiskCache {
    /// Root directory joined with the cache space
    base_path: PathBuf,
    cache_space: Option<String>,
    fs: Arc<dyn Filesystem>,
    /// Mirror filled by stores that ask for it
    memory: Option<Arc<dyn MemoryStore>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

/// Builder for a [`DiskCache`] with an explicit root and collaborators
pub struct DiskCacheBuilder {
    root: PathBuf,
    cache_space: Option<String>,
    fs: Arc<dyn Filesystem>,
    memory: Option<Arc<dyn MemoryStore>>,
}

impl DiskCacheBuilder {
    /// Name of the subdirectory of the root to use; empty means the root itself
    pub fn cache_space(mut self, cache_space: impl Into<String>) -> Self {
        self.cache_space = Some(cache_space.into());
        self
    }

    pub fn filesystem(mut self, fs: Arc<dyn Filesystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn memory_store(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Resolve the base path and make sure the directory exists
    pub fn build(self) -> Result<DiskCache> {
        let cache_space = match self.cache_space {
            Some(space) if space.is_empty() => None,
            Some(space) => {
                validate_cache_space(&space)?;
                Some(space)
            }
            None => None,
        };

        let base_path = match &cache_space {
            Some(space) => self.root.join(space),
            None => self.root,
        };

        self.fs
            .create_dir_all(&base_path)
            .map_err(|source| DiskCacheError::DirectoryCreation {
                path: base_path.clone(),
                source,
            })?;

        info!(base_path = ?base_path, memory = self.memory.is_some(), "Cache initialized");

        Ok(DiskCache {
            base_path,
            cache_space,
            fs: self.fs,
            memory: self.memory,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        })
    }
}

/// A cache space must name exactly one directory below the root
fn validate_cache_space(space: &str) -> Result<()> {
    let mut components = Path::new(space).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !space.contains(['/', '\\']) => Ok(()),
        _ => Err(DiskCacheError::InvalidCacheSpace(space.to_string())),
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(TEMP_PREFIX))
        .unwrap_or(false)
}

impl DiskCache {
    /// Create a cache for `cache_space` under the root configured in the environment
    pub fn new(cache_space: Option<&str>) -> Result<Self> {
        Self::from_config(&DiskCacheConfig::from_env(), cache_space)
    }

    /// Create a cache for `cache_space` from an explicit configuration
    pub fn from_config(config: &DiskCacheConfig, cache_space: Option<&str>) -> Result<Self> {
        let mut builder = Self::builder(config.root_dir.clone());
        if let Some(space) = cache_space {
            builder = builder.cache_space(space);
        }
        if config.memory_capacity_bytes > 0 {
            builder = builder.memory_store(Arc::new(MokaMemoryStore::new(
                config.memory_capacity_bytes,
            )));
        }
        builder.build()
    }

    /// Start building a cache rooted at `root` on the local filesystem, without
    /// a memory store
    pub fn builder(root: impl Into<PathBuf>) -> DiskCacheBuilder {
        DiskCacheBuilder {
            root: root.into(),
            cache_space: None,
            fs: Arc::new(LocalFilesystem),
            memory: None,
        }
    }

    /// The process-wide cache for the "Default" cache space
    ///
    /// Created on the first successful call; a failed creation is retried by
    /// the next caller.
    pub fn shared_instance() -> Result<&'static DiskCache> {
        if let Some(cache) = SHARED.get() {
            return Ok(cache);
        }

        let _guard = SHARED_INIT
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(cache) = SHARED.get() {
            return Ok(cache);
        }

        let cache = Self::new(Some(DEFAULT_CACHE_SPACE))?;
        Ok(SHARED.get_or_init(|| cache))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn cache_space(&self) -> Option<&str> {
        self.cache_space.as_deref()
    }

    // Path and key

    /// File name an entry for `key` is stored under
    pub fn file_name_from_key(&self, key: &str) -> Result<String> {
        file_name_from_key(key)
    }

    /// Full path an entry for `key` is stored at
    pub fn file_path_from_key(&self, key: &str) -> Result<PathBuf> {
        Ok(self.base_path.join(file_name_from_key(key)?))
    }

    /// Full path of an already-resolved file name
    pub fn file_path_from_file_name(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }

    // Blocking API. Failures are logged and collapsed to bool/None/0.

    /// Store `data` under `key`, replacing any previous entry
    pub fn store_data(&self, data: &[u8], key: &str, store_memory: bool) -> bool {
        match self.try_store(data, key, store_memory) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to store entry");
                false
            }
        }
    }

    /// Remove the entry for `key`; removing an absent key succeeds
    pub fn remove_data_for_key(&self, key: &str) -> bool {
        match self.try_remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to remove entry");
                false
            }
        }
    }

    /// Remove every entry in this cache space, keeping the directory.
    ///
    /// Only files directly under the base path are removed. On a root cache
    /// (no cache space) the nested cache-space directories are left intact,
    /// so [`cache_size`](Self::cache_size) can stay non-zero afterwards.
    pub fn clear_data(&self) -> bool {
        match self.try_clear() {
            Ok(()) => true,
            Err(e) => {
                warn!(base_path = ?self.base_path, error = %e, "Failed to clear cache");
                false
            }
        }
    }

    /// Bytes stored under `key`, or `None` if absent or unreadable
    pub fn data_for_key(&self, key: &str) -> Option<Vec<u8>> {
        match self.try_fetch(key) {
            Ok(data) => data,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read entry");
                None
            }
        }
    }

    /// Total length of the files below the base path.
    ///
    /// For a root cache this includes every cache space nested under it.
    pub fn cache_size(&self) -> u64 {
        match self.try_size() {
            Ok(size) => size,
            Err(e) => {
                warn!(base_path = ?self.base_path, error = %e, "Failed to compute cache size");
                0
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        match self.try_stats() {
            Ok(stats) => stats,
            Err(e) => {
                warn!(base_path = ?self.base_path, error = %e, "Failed to collect cache stats");
                CacheStats {
                    hits: self.hits.load(Ordering::Relaxed),
                    misses: self.misses.load(Ordering::Relaxed),
                    ..CacheStats::default()
                }
            }
        }
    }

    // Async API. Runs on the tokio blocking pool and reports the error.

    pub async fn store_data_async(
        &self,
        data: Vec<u8>,
        key: &str,
        store_memory: bool,
    ) -> Result<()> {
        let key = key.to_string();
        self.run_blocking(move |cache| cache.try_store(&data, &key, store_memory))
            .await
    }

    pub async fn remove_data_for_key_async(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.run_blocking(move |cache| cache.try_remove(&key)).await
    }

    /// Same scope as [`clear_data`](Self::clear_data)
    pub async fn clear_data_async(&self) -> Result<()> {
        self.run_blocking(|cache| cache.try_clear()).await
    }

    /// `Ok(None)` when no entry exists; other read failures are errors
    pub async fn data_for_key_async(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();
        self.run_blocking(move |cache| cache.try_fetch(&key)).await
    }

    pub async fn cache_size_async(&self) -> Result<u64> {
        self.run_blocking(|cache| cache.try_size()).await
    }

    pub async fn stats_async(&self) -> Result<CacheStats> {
        self.run_blocking(|cache| cache.try_stats()).await
    }

    async fn run_blocking<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(DiskCache) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let cache = self.clone();
        tokio::task::spawn_blocking(move || work(cache)).await?
    }

    // Operations shared by both APIs

    fn try_store(&self, data: &[u8], key: &str, store_memory: bool) -> Result<()> {
        let path = self.file_path_from_key(key)?;

        self.fs
            .write_file(&path, data)
            .map_err(|source| DiskCacheError::Write {
                path: path.clone(),
                source,
            })?;

        if let Some(memory) = &self.memory {
            if store_memory {
                memory.insert(key, data.to_vec());
            } else {
                // Drop a mirrored copy that would now be stale
                memory.remove(key);
            }
        }

        debug!(key = %key, size = data.len(), "Stored entry");
        Ok(())
    }

    fn try_remove(&self, key: &str) -> Result<()> {
        let path = self.file_path_from_key(key)?;

        if let Some(memory) = &self.memory {
            memory.remove(key);
        }

        self.fs.remove_file(&path)?;
        debug!(key = %key, "Removed entry");
        Ok(())
    }

    fn try_clear(&self) -> Result<()> {
        if let Some(memory) = &self.memory {
            memory.clear();
        }

        // Subdirectories are left alone: below the root they are other cache spaces
        let files = self.fs.list_files(&self.base_path)?;
        let attempted = files.len();
        let mut failed = 0;
        let mut first_error: Option<io::Error> = None;

        for path in files {
            if let Err(e) = self.fs.remove_file(&path) {
                warn!(path = ?path, error = %e, "Failed to remove cache file");
                failed += 1;
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(source) => Err(DiskCacheError::Delete {
                failed,
                attempted,
                source,
            }),
            None => {
                debug!(base_path = ?self.base_path, removed = attempted, "Cleared cache");
                Ok(())
            }
        }
    }

    fn try_fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.file_path_from_key(key)?;

        if let Some(data) = self.memory.as_ref().and_then(|memory| memory.get(key)) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Memory hit");
            return Ok(Some(data));
        }

        match self.fs.read_file(&path) {
            Ok(data) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, size = data.len(), "Cache hit");
                Ok(Some(data))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
            Err(source) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Err(DiskCacheError::Read { path, source })
            }
        }
    }

    fn try_size(&self) -> Result<u64> {
        Ok(self.fs.size_of(&self.base_path)?)
    }

    fn try_stats(&self) -> Result<CacheStats> {
        let entries = self
            .fs
            .list_files(&self.base_path)?
            .iter()
            .filter(|path| !is_temp_file(path))
            .count();

        Ok(CacheStats {
            entries,
            total_size: self.try_size()?,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }
}

impl fmt::Debug for DiskCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskCache")
            .field("base_path", &self.base_path)
            .field("cache_space", &self.cache_space)
            .field("memory", &self.memory.is_some())
            .finish()
    }
}
