//! Error types for the disk-cache CLI

use std::fmt;

#[derive(Debug)]
pub enum CliError {
    Cache(disk_cache::DiskCacheError),
    Io(Box<std::io::Error>),
    Json(serde_json::Error),
    NotFound(String),
    Config(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Cache(err) => write!(f, "Cache error: {}", err),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Json(err) => write!(f, "JSON error: {}", err),
            CliError::NotFound(key) => write!(f, "No entry for key: {}", key),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Cache(err) => Some(err),
            CliError::Io(err) => Some(err.as_ref()),
            CliError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<disk_cache::DiskCacheError> for CliError {
    fn from(err: disk_cache::DiskCacheError) -> Self {
        CliError::Cache(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for CliError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        CliError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_display() {
        let err = CliError::NotFound("avatar".to_string());
        assert_eq!(format!("{}", err), "No entry for key: avatar");
    }

    #[test]
    fn test_cache_error_display() {
        let err = CliError::Cache(disk_cache::DiskCacheError::InvalidKey);
        assert_eq!(
            format!("{}", err),
            "Cache error: Invalid key: key must not be empty"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("bad filter".to_string());
        assert_eq!(format!("{}", err), "Configuration error: bad filter");
    }
}
