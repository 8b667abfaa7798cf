//! Filesystem capability used by the cache

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prefix of the temporary files a write goes through before being renamed
/// into place
pub(crate) const TEMP_PREFIX: &str = ".tmp";

/// Blocking filesystem operations the cache is built on
///
/// Implementations must be usable from the tokio blocking pool, hence
/// `Send + Sync`.
pub trait Filesystem: Send + Sync {
    /// Create a directory and its parents; succeeds if it already exists
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Replace the file at `path` with `data`; readers never observe a partial write
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Read the whole file at `path`
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Remove a file; a missing file is not an error
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Paths of the regular files directly inside `dir`
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Length of a file, or the summed length of every file below a directory
    fn size_of(&self, path: &Path) -> io::Result<u64>;
}

/// [`Filesystem`] backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let dir = path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory")
        })?;

        // Write next to the target so the rename stays on one filesystem
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)?;
        tmp.write_all(data)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn size_of(&self, path: &Path) -> io::Result<u64> {
        let meta = fs::metadata(path)?;
        if !meta.is_dir() {
            return Ok(meta.len());
        }

        let mut total = 0u64;
        for entry in WalkDir::new(path).min_depth(1) {
            // Entries can vanish under a concurrent remove or clear
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_not_found(&e) => continue,
                Err(e) => return Err(e.into()),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.metadata() {
                Ok(meta) => total += meta.len(),
                Err(e) if is_not_found(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .map(|e| e.kind() == io::ErrorKind::NotFound)
        .unwrap_or(false)
}
