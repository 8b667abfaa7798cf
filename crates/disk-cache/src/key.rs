//! Key to file name mapping

use crate::error::{DiskCacheError, Result};
use sha2::{Digest, Sha256};

/// Derive the on-disk file name for a key (lowercase SHA-256 hex)
pub fn file_name_from_key(key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(DiskCacheError::InvalidKey);
    }

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
