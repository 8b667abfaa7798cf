//! Cache types

use serde::{Deserialize, Serialize};

/// Statistics about a cache space
///
/// `entries` and `total_size` are read from the directory when requested;
/// `hits` and `misses` count fetches made through one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
}
