//! Checksum verification of an existing distribution directory.

use crate::bundler::checksum::{self, SIDECAR_EXTENSION};
use crate::bundler::{EXE_SUFFIX, Error, Result};
use std::path::{Path, PathBuf};

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStatus {
    /// Sidecar matches the bytes on disk
    Verified {
        /// Checksum of the file
        checksum: String,
    },
    /// File exists but has no sidecar
    MissingSidecar,
    /// Sidecar disagrees with the bytes on disk
    Mismatch {
        /// Checksum in the sidecar
        expected: String,
        /// Checksum of the file
        actual: String,
    },
    /// Sidecar exists but cannot be read or parsed
    Unreadable {
        /// Reason
        reason: String,
    },
}

impl VerifyStatus {
    /// Whether this status counts as success
    pub fn is_ok(&self) -> bool {
        matches!(self, VerifyStatus::Verified { .. })
    }
}

/// Verification results for a distribution directory
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Results in check order
    pub entries: Vec<(PathBuf, VerifyStatus)>,
    /// Configured binaries that have not been built
    pub not_built: Vec<String>,
}

impl VerifyReport {
    /// True when at least one file was checked and all passed
    pub fn is_success(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|(_, status)| status.is_ok())
    }

    /// Number of failed checks
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|(_, s)| !s.is_ok()).count()
    }
}

/// Verify the executables for `binaries` and any checksummed archives in
/// `dist_dir`.
pub async fn verify_dist(dist_dir: &Path, binaries: &[String]) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    for binary in binaries {
        let executable = dist_dir.join(binary).join(format!("{binary}{EXE_SUFFIX}"));
        if !executable.is_file() {
            log::debug!("{} not built; skipping", executable.display());
            report.not_built.push(binary.clone());
            continue;
        }
        let status = check(&executable).await?;
        report.entries.push((executable, status));
    }

    for archive in sidecar_subjects(dist_dir).await? {
        let status = check(&archive).await?;
        report.entries.push((archive, status));
    }

    Ok(report)
}

async fn check(file: &Path) -> Result<VerifyStatus> {
    let sidecar = checksum::sidecar_path(file);
    if !sidecar.is_file() {
        return Ok(VerifyStatus::MissingSidecar);
    }

    match checksum::verify_sidecar(file).await {
        Ok(checksum) => Ok(VerifyStatus::Verified { checksum }),
        Err(Error::HashMismatch {
            expected, actual, ..
        }) => Ok(VerifyStatus::Mismatch { expected, actual }),
        Err(Error::GenericError(reason)) => Ok(VerifyStatus::Unreadable { reason }),
        Err(e) => Err(e),
    }
}

/// Files directly under `dist_dir` that have a sidecar next to them.
async fn sidecar_subjects(dist_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut subjects = Vec::new();
    let mut entries = match tokio::fs::read_dir(dist_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(subjects),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == SIDECAR_EXTENSION)
            && let Some(stem) = path.file_stem()
        {
            let subject = path.with_file_name(stem);
            if subject.is_file() {
                subjects.push(subject);
            }
        }
    }
    subjects.sort();
    Ok(subjects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executable(dist: &Path, binary: &str, bytes: &[u8]) -> PathBuf {
        let dir = dist.join(binary);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{binary}{EXE_SUFFIX}"));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_verified_and_not_built() {
        let dir = tempfile::tempdir().unwrap();
        let exe = executable(dir.path(), "wems", b"gui");
        checksum::write_sidecar(&exe).await.unwrap();

        let report = verify_dist(dir.path(), &["wems".into(), "wems-cli".into()])
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.not_built, vec!["wems-cli".to_string()]);
    }

    #[tokio::test]
    async fn test_tampered_binary() {
        let dir = tempfile::tempdir().unwrap();
        let exe = executable(dir.path(), "wems", b"gui");
        checksum::write_sidecar(&exe).await.unwrap();
        std::fs::write(&exe, b"patched").unwrap();

        let report = verify_dist(dir.path(), &["wems".into()]).await.unwrap();
        assert!(!report.is_success());
        assert!(matches!(report.entries[0].1, VerifyStatus::Mismatch { .. }));
    }

    #[tokio::test]
    async fn test_missing_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        executable(dir.path(), "wems", b"gui");

        let report = verify_dist(dir.path(), &["wems".into()]).await.unwrap();
        assert_eq!(report.failures(), 1);
        assert_eq!(report.entries[0].1, VerifyStatus::MissingSidecar);
    }

    #[tokio::test]
    async fn test_archives_are_checked() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("wems-1.2.3-linux-x86_64.tar.gz");
        std::fs::write(&archive, b"archive").unwrap();
        checksum::write_sidecar(&archive).await.unwrap();

        let report = verify_dist(dir.path(), &[]).await.unwrap();
        assert_eq!(report.entries.len(), 1);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_empty_dist_is_not_success() {
        let dir = tempfile::tempdir().unwrap();
        let report = verify_dist(&dir.path().join("dist"), &["wems".into()])
            .await
            .unwrap();
        assert!(!report.is_success());
    }
}
