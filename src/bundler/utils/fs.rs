//! File system utilities for bundling and finalizing.
//!
//! Provides safe file operations with automatic directory creation
//! and path-annotated errors.

use crate::bundler::error::{ErrorExt, Result};
use std::path::Path;
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => {
            log::debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Writes `contents` to `path`, creating parent directories as needed.
///
/// The data is written to a sibling temporary file first and then renamed
/// into place, so readers never observe a half-written file.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating parent directory", parent)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)
        .await
        .fs_context("writing file", &tmp_path)?;
    fs::rename(&tmp_path, path)
        .await
        .fs_context("moving file into place", path)
}

/// Returns the size of a file in bytes.
pub async fn file_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path)
        .await
        .fs_context("reading file metadata", path)?;
    Ok(metadata.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("dist").join("wems").join("wems.sha256");

        write_file(&target, b"abc").await.unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"abc");
        assert!(!target.with_file_name("wems.sha256.tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        remove_dir_all(&dir.path().join("missing")).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_dir_all_erases() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir_all(dist.join("stale")).unwrap();

        create_dir_all(&dist, true).await.unwrap();

        assert!(dist.exists());
        assert!(!dist.join("stale").exists());
    }
}
