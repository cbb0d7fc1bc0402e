//! Artifact finalization and distribution.
//!
//! After the bundler succeeds, every executable gets a checksum sidecar and a
//! version-info file. Checksums are computed from the bytes on disk at this
//! moment, never carried over from an earlier run.

pub mod archive;
pub mod manifest;
pub mod verify;
pub mod version_info;

pub use archive::{ArchiveArtifact, package};
pub use manifest::{BuildManifest, MANIFEST_FILE};
pub use verify::{VerifyReport, VerifyStatus, verify_dist};
pub use version_info::{BuildInfo, detect_python_version, host_platform};

use crate::bundler::checksum;
use crate::bundler::utils::fs;
use crate::bundler::{BundledTarget, Result};
use crate::config::BuildTarget;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Suffix of the version-info file next to each target directory
pub const VERSION_INFO_SUFFIX: &str = "-version.txt";

/// A finalized executable
#[derive(Debug, Clone, Serialize)]
pub struct BuildArtifact {
    /// Target that produced it
    pub target: BuildTarget,
    /// Binary name
    pub binary: String,
    /// Host platform
    pub platform: String,
    /// Executable path
    pub binary_path: PathBuf,
    /// Executable size
    pub size_bytes: u64,
    /// Lowercase hex SHA-256 of the executable
    pub checksum: String,
    /// Sidecar holding `checksum`
    pub checksum_path: PathBuf,
    /// `dist/<binary>-version.txt`
    pub version_info_path: PathBuf,
    /// Contents of the version-info file
    #[serde(skip)]
    pub version_info_text: String,
}

/// Path of the version-info file for `binary`
pub fn version_info_path(dist_dir: &Path, binary: &str) -> PathBuf {
    dist_dir.join(format!("{binary}{VERSION_INFO_SUFFIX}"))
}

/// Writes sidecars and version-info files.
#[derive(Debug)]
pub struct Finalizer<'a> {
    dist_dir: &'a Path,
    info: &'a BuildInfo,
}

impl<'a> Finalizer<'a> {
    /// Create a finalizer writing into `dist_dir`
    pub fn new(dist_dir: &'a Path, info: &'a BuildInfo) -> Self {
        Self { dist_dir, info }
    }

    /// Checksum `bundled` and write its metadata files.
    pub async fn finalize(&self, bundled: &BundledTarget) -> Result<BuildArtifact> {
        let size_bytes = fs::file_size(&bundled.executable).await?;
        let (checksum, checksum_path) = checksum::write_sidecar(&bundled.executable).await?;

        let version_info_text = self.info.render(bundled.target);
        let version_info_path = version_info_path(self.dist_dir, &bundled.binary);
        fs::write_file(&version_info_path, &version_info_text).await?;

        log::info!(
            "Finalized {} ({size_bytes} bytes, sha256 {checksum})",
            bundled.executable.display()
        );

        Ok(BuildArtifact {
            target: bundled.target,
            binary: bundled.binary.clone(),
            platform: self.info.platform.clone(),
            binary_path: bundled.executable.clone(),
            size_bytes,
            checksum,
            checksum_path,
            version_info_path,
            version_info_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ResolvedVersion;

    #[tokio::test]
    async fn test_finalize_writes_sidecar_and_version_info() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        let output_dir = dist.join("wems-cli");
        std::fs::create_dir_all(&output_dir).unwrap();
        let executable = output_dir.join("wems-cli");
        std::fs::write(&executable, b"hello world").unwrap();

        let info = BuildInfo {
            product: "Wareflow EMS".into(),
            version: ResolvedVersion::unknown(),
            built_at: chrono::Utc::now(),
            platform: host_platform(),
            python_version: "3.12.4".into(),
        };
        let bundled = BundledTarget {
            target: BuildTarget::Cli,
            binary: "wems-cli".into(),
            output_dir,
            executable: executable.clone(),
        };

        let artifact = Finalizer::new(&dist, &info)
            .finalize(&bundled)
            .await
            .unwrap();

        assert_eq!(artifact.size_bytes, 11);
        assert_eq!(
            artifact.checksum,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(artifact.checksum_path, dist.join("wems-cli/wems-cli.sha256"));
        assert_eq!(artifact.version_info_path, dist.join("wems-cli-version.txt"));

        let written = std::fs::read_to_string(&artifact.version_info_path).unwrap();
        assert_eq!(written, artifact.version_info_text);
        assert_eq!(
            version_info::field(&written, version_info::VERSION_FIELD),
            Some("unknown")
        );
        assert_eq!(
            version_info::field(&written, version_info::CHANNEL_FIELD),
            Some("non-releasable")
        );
    }

    #[tokio::test]
    async fn test_checksum_reflects_rebuilt_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        let output_dir = dist.join("wems");
        std::fs::create_dir_all(&output_dir).unwrap();
        let executable = output_dir.join("wems");

        let info = BuildInfo {
            product: "Wareflow EMS".into(),
            version: ResolvedVersion::unknown(),
            built_at: chrono::Utc::now(),
            platform: host_platform(),
            python_version: "unknown".into(),
        };
        let bundled = BundledTarget {
            target: BuildTarget::Gui,
            binary: "wems".into(),
            output_dir,
            executable: executable.clone(),
        };
        let finalizer = Finalizer::new(&dist, &info);

        std::fs::write(&executable, b"first build").unwrap();
        let first = finalizer.finalize(&bundled).await.unwrap();
        std::fs::write(&executable, b"second build").unwrap();
        let second = finalizer.finalize(&bundled).await.unwrap();

        assert_ne!(first.checksum, second.checksum);
        assert_eq!(
            checksum::read_sidecar(&second.checksum_path).await.unwrap(),
            second.checksum
        );
    }
}
