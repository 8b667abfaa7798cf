//! Cache configuration

use std::env;
use std::path::PathBuf;

/// Name of the directory all cache spaces live under
pub const ROOT_DIR_NAME: &str = "YQDataCache";

const DEFAULT_MEMORY_CAPACITY_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB

/// Cache configuration parsed from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskCacheConfig {
    /// Directory holding every cache space
    pub root_dir: PathBuf,
    /// Byte budget of the in-memory mirror; 0 disables it
    pub memory_capacity_bytes: u64,
}

impl DiskCacheConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("DISK_CACHE_ROOT").ok(),
            env::var("DISK_CACHE_MEMORY_BYTES").ok(),
        )
    }

    fn from_vars(root: Option<String>, memory_bytes: Option<String>) -> Self {
        let root_dir = root
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_root_dir);

        let memory_capacity_bytes = memory_bytes
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_MEMORY_CAPACITY_BYTES);

        Self {
            root_dir,
            memory_capacity_bytes,
        }
    }
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            memory_capacity_bytes: DEFAULT_MEMORY_CAPACITY_BYTES,
        }
    }
}

/// `<documents dir>/YQDataCache`, falling back to the user data dir and then
/// the working directory
fn default_root_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(ROOT_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiskCacheConfig::default();
        assert!(config.root_dir.ends_with(ROOT_DIR_NAME));
        assert_eq!(config.memory_capacity_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn test_explicit_vars() {
        let config = DiskCacheConfig::from_vars(
            Some("/var/cache/app".to_string()),
            Some("1024".to_string()),
        );
        assert_eq!(config.root_dir, PathBuf::from("/var/cache/app"));
        assert_eq!(config.memory_capacity_bytes, 1024);
    }

    #[test]
    fn test_zero_memory_disables_mirror() {
        let config = DiskCacheConfig::from_vars(None, Some("0".to_string()));
        assert_eq!(config.memory_capacity_bytes, 0);
    }

    #[test]
    fn test_invalid_vars_fall_back() {
        let config =
            DiskCacheConfig::from_vars(Some("  ".to_string()), Some("lots".to_string()));
        assert_eq!(config, DiskCacheConfig::default());
    }
}
