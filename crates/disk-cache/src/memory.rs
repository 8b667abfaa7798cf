//! Optional in-memory mirror of stored entries

use moka::sync::Cache;

/// Key-value store a cache mirrors values into when asked to
pub trait MemoryStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn insert(&self, key: &str, data: Vec<u8>);
    fn remove(&self, key: &str);
    fn clear(&self);
}

/// Byte-bounded [`MemoryStore`] on top of a moka cache
pub struct MokaMemoryStore {
    cache: Cache<String, Vec<u8>>,
}

impl MokaMemoryStore {
    /// Create a store holding at most `max_bytes` of values
    pub fn new(max_bytes: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_bytes)
            .weigher(|_key: &String, value: &Vec<u8>| -> u32 {
                value.len().try_into().unwrap_or(u32::MAX)
            })
            .build();

        Self { cache }
    }
}

impl MemoryStore for MokaMemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key)
    }

    fn insert(&self, key: &str, data: Vec<u8>) {
        self.cache.insert(key.to_string(), data);
    }

    fn remove(&self, key: &str) {
        self.cache.invalidate(key);
    }

    fn clear(&self) {
        self.cache.invalidate_all();
    }
}
