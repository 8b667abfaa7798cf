//! Error types for the disk cache

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum DiskCacheError {
    DirectoryCreation { path: PathBuf, source: io::Error },
    InvalidKey,
    InvalidCacheSpace(String),
    Write { path: PathBuf, source: io::Error },
    Read { path: PathBuf, source: io::Error },
    Delete {
        failed: usize,
        attempted: usize,
        source: io::Error,
    },
    Io(Box<io::Error>),
    Background(String),
}

impl fmt::Display for DiskCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskCacheError::DirectoryCreation { path, source } => {
                write!(f, "Failed to create cache directory {:?}: {}", path, source)
            }
            DiskCacheError::InvalidKey => write!(f, "Invalid key: key must not be empty"),
            DiskCacheError::InvalidCacheSpace(name) => {
                write!(f, "Invalid cache space: {:?}", name)
            }
            DiskCacheError::Write { path, source } => {
                write!(f, "Write error at {:?}: {}", path, source)
            }
            DiskCacheError::Read { path, source } => {
                write!(f, "Read error at {:?}: {}", path, source)
            }
            DiskCacheError::Delete {
                failed,
                attempted,
                source,
            } => write!(
                f,
                "Delete error: {} of {} entries could not be removed (first: {})",
                failed, attempted, source
            ),
            DiskCacheError::Io(err) => write!(f, "IO error: {}", err),
            DiskCacheError::Background(msg) => write!(f, "Background task error: {}", msg),
        }
    }
}

impl std::error::Error for DiskCacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiskCacheError::DirectoryCreation { source, .. }
            | DiskCacheError::Write { source, .. }
            | DiskCacheError::Read { source, .. }
            | DiskCacheError::Delete { source, .. } => Some(source),
            DiskCacheError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for DiskCacheError {
    fn from(err: io::Error) -> Self {
        DiskCacheError::Io(Box::new(err))
    }
}

impl From<tokio::task::JoinError> for DiskCacheError {
    fn from(err: tokio::task::JoinError) -> Self {
        DiskCacheError::Background(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DiskCacheError>;
