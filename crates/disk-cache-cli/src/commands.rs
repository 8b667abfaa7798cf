//! Subcommand implementations

use crate::cli::Command;
use crate::error::{CliError, Result};
use disk_cache::DiskCache;
use std::io::{Read, Write};
use tracing::info;

/// Run one subcommand against `cache`, reading blob input from `input` and
/// writing results to `output`
pub async fn execute<R: Read, W: Write>(
    cache: &DiskCache,
    command: Command,
    mut input: R,
    output: &mut W,
) -> Result<()> {
    match command {
        Command::Put { key, file } => {
            let data = match file {
                Some(path) => std::fs::read(path)?,
                None => {
                    let mut buf = Vec::new();
                    input.read_to_end(&mut buf)?;
                    buf
                }
            };
            let size = data.len();
            cache.store_data_async(data, &key, false).await?;
            info!(key = %key, size, "Stored entry");
        }
        Command::Get { key, out } => {
            let data = cache
                .data_for_key_async(&key)
                .await?
                .ok_or_else(|| CliError::NotFound(key.clone()))?;
            match out {
                Some(path) => std::fs::write(path, &data)?,
                None => output.write_all(&data)?,
            }
        }
        Command::Rm { key } => {
            cache.remove_data_for_key_async(&key).await?;
        }
        Command::Clear => {
            cache.clear_data_async().await?;
            info!(base_path = ?cache.base_path(), "Cleared cache space");
        }
        Command::Size => {
            let size = cache.cache_size_async().await?;
            writeln!(output, "{}", size)?;
        }
        Command::Path { key } => {
            let path = cache.file_path_from_key(&key)?;
            writeln!(output, "{}", path.display())?;
        }
        Command::Stats => {
            let stats = cache.stats_async().await?;
            writeln!(output, "{}", serde_json::to_string_pretty(&stats)?)?;
        }
    }

    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_cache(root: &std::path::Path) -> DiskCache {
        DiskCache::builder(root).cache_space("cli").build().unwrap()
    }

    async fn run(cache: &DiskCache, command: Command, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        execute(cache, command, input, &mut output).await?;
        Ok(output)
    }

    #[tokio::test]
    async fn test_put_from_stdin_then_get() {
        let dir = tempdir().unwrap();
        let cache = test_cache(dir.path());

        let put = Command::Put {
            key: "greeting".to_string(),
            file: None,
        };
        run(&cache, put, b"hello\x00world").await.unwrap();

        let get = Command::Get {
            key: "greeting".to_string(),
            out: None,
        };
        let output = run(&cache, get, b"").await.unwrap();
        assert_eq!(output, b"hello\x00world");
    }

    #[tokio::test]
    async fn test_put_from_file_and_get_to_file() {
        let dir = tempdir().unwrap();
        let cache = test_cache(dir.path());
        let source = dir.path().join("in.bin");
        let target = dir.path().join("out.bin");
        std::fs::write(&source, [1u8, 2, 3]).unwrap();

        let put = Command::Put {
            key: "k".to_string(),
            file: Some(source),
        };
        run(&cache, put, b"").await.unwrap();

        let get = Command::Get {
            key: "k".to_string(),
            out: Some(target.clone()),
        };
        let output = run(&cache, get, b"").await.unwrap();
        assert!(output.is_empty());
        assert_eq!(std::fs::read(target).unwrap(), vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let dir = tempdir().unwrap();
        let cache = test_cache(dir.path());

        let get = Command::Get {
            key: "missing".to_string(),
            out: None,
        };
        let err = run(&cache, get, b"").await.unwrap_err();
        assert!(matches!(err, CliError::NotFound(ref key) if key == "missing"));
    }

    #[tokio::test]
    async fn test_size_rm_and_clear() {
        let dir = tempdir().unwrap();
        let cache = test_cache(dir.path());

        for (key, data) in [("a", &b"1234"[..]), ("b", &b"56"[..])] {
            let put = Command::Put {
                key: key.to_string(),
                file: None,
            };
            run(&cache, put, data).await.unwrap();
        }
        assert_eq!(run(&cache, Command::Size, b"").await.unwrap(), b"6\n");

        let rm = Command::Rm {
            key: "a".to_string(),
        };
        run(&cache, rm, b"").await.unwrap();
        assert_eq!(run(&cache, Command::Size, b"").await.unwrap(), b"2\n");

        run(&cache, Command::Clear, b"").await.unwrap();
        assert_eq!(run(&cache, Command::Size, b"").await.unwrap(), b"0\n");
    }

    #[tokio::test]
    async fn test_path_and_stats() {
        let dir = tempdir().unwrap();
        let cache = test_cache(dir.path());

        let path = Command::Path {
            key: "k".to_string(),
        };
        let output = String::from_utf8(run(&cache, path, b"").await.unwrap()).unwrap();
        let expected = cache.file_path_from_key("k").unwrap();
        assert_eq!(output.trim_end(), expected.display().to_string());

        let output = run(&cache, Command::Stats, b"").await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["entries"], 0);
        assert_eq!(json["total_size"], 0);
    }
}
