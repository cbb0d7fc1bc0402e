//! Artifact checksum calculation and sidecar files.
//!
//! Checksums are always computed from the bytes currently on disk; nothing
//! is cached between calls.

use crate::bundler::error::{Error, ErrorExt, Result};
use crate::bundler::utils::fs;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Extension appended to a file name to form its checksum sidecar
pub const SIDECAR_EXTENSION: &str = "sha256";

/// Calculates the SHA-256 checksum of a file.
///
/// Reads in 8KB chunks so large executables and archives are never held in
/// memory at once.
pub async fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Sidecar path for `file` (`wems` → `wems.sha256`).
pub fn sidecar_path(file: &Path) -> PathBuf {
    let mut name = file.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    file.with_file_name(name)
}

/// Hash `file` and write its sidecar in `sha256sum` format.
///
/// Returns the checksum and the sidecar path.
pub async fn write_sidecar(file: &Path) -> Result<(String, PathBuf)> {
    let checksum = calculate_sha256(file).await?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sidecar = sidecar_path(file);

    fs::write_file(&sidecar, format!("{checksum}  {name}\n")).await?;
    log::debug!("Wrote {} ({checksum})", sidecar.display());

    Ok((checksum, sidecar))
}

/// Read the checksum recorded in a sidecar file.
pub async fn read_sidecar(sidecar: &Path) -> Result<String> {
    let contents = tokio::fs::read_to_string(sidecar)
        .await
        .fs_context("reading checksum sidecar", sidecar)?;
    let checksum = contents
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    let valid = checksum.len() == 64 && hex::decode(&checksum).is_ok();
    if !valid {
        crate::bail!("{} does not contain a SHA-256 checksum", sidecar.display());
    }
    Ok(checksum)
}

/// Recompute the checksum of `file` and compare it with its sidecar.
pub async fn verify_sidecar(file: &Path) -> Result<String> {
    let expected = read_sidecar(&sidecar_path(file)).await?;
    let actual = calculate_sha256(file).await?;
    if expected != actual {
        return Err(Error::HashMismatch {
            path: file.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello world")
    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[tokio::test]
    async fn test_file_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("wems");
        std::fs::write(&file, b"hello world").unwrap();

        assert_eq!(calculate_sha256(&file).await.unwrap(), HELLO_SHA256);
    }

    #[tokio::test]
    async fn test_sidecar_matches_current_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("wems");
        std::fs::write(&file, b"hello world").unwrap();

        let (checksum, sidecar) = write_sidecar(&file).await.unwrap();
        assert_eq!(sidecar, dir.path().join("wems.sha256"));
        assert_eq!(
            std::fs::read_to_string(&sidecar).unwrap(),
            format!("{HELLO_SHA256}  wems\n")
        );
        assert_eq!(verify_sidecar(&file).await.unwrap(), checksum);
    }

    #[tokio::test]
    async fn test_tampered_file_detected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("wems");
        std::fs::write(&file, b"hello world").unwrap();
        write_sidecar(&file).await.unwrap();

        std::fs::write(&file, b"hello w0rld").unwrap();

        assert!(matches!(
            verify_sidecar(&file).await,
            Err(Error::HashMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("wems");
        let err = calculate_sha256(&missing).await.unwrap_err();
        assert!(err.to_string().contains("opening file for hashing"));
    }

    #[tokio::test]
    async fn test_garbage_sidecar_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir.path().join("wems.sha256");
        std::fs::write(&sidecar, "not-a-checksum wems\n").unwrap();
        assert!(read_sidecar(&sidecar).await.is_err());
    }
}
