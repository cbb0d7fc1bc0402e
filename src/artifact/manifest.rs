//! Machine-readable record of a build run.

use super::{ArchiveArtifact, BuildArtifact, BuildInfo};
use crate::bundler::Result;
use crate::bundler::error::ErrorExt;
use crate::bundler::utils::fs;
use crate::version::{ReleaseChannel, VersionSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Manifest file name inside the distribution directory
pub const MANIFEST_FILE: &str = "build-manifest.json";

/// `dist/build-manifest.json`
#[derive(Debug, Clone, Serialize)]
pub struct BuildManifest {
    /// Unique id of this run
    pub build_id: Uuid,
    /// Product name
    pub product: String,
    /// Version written into the artifacts
    pub version: String,
    /// Version provenance
    pub source: VersionSource,
    /// Release channel
    pub channel: ReleaseChannel,
    /// Build start time
    pub built_at: DateTime<Utc>,
    /// Host platform
    pub platform: String,
    /// Interpreter version
    pub python_version: String,
    /// Whether the test gate was skipped
    pub tests_skipped: bool,
    /// Finalized executables
    pub artifacts: Vec<BuildArtifact>,
    /// Distribution archives
    pub archives: Vec<ArchiveArtifact>,
}

impl BuildManifest {
    /// Assemble a manifest from the build's outputs.
    pub fn new(
        info: &BuildInfo,
        tests_skipped: bool,
        artifacts: Vec<BuildArtifact>,
        archives: Vec<ArchiveArtifact>,
    ) -> Self {
        Self {
            build_id: Uuid::new_v4(),
            product: info.product.clone(),
            version: info.version.version.clone(),
            source: info.version.source.clone(),
            channel: info.version.channel(),
            built_at: info.built_at,
            platform: info.platform.clone(),
            python_version: info.python_version.clone(),
            tests_skipped,
            artifacts,
            archives,
        }
    }

    /// Write to `<dist_dir>/build-manifest.json`.
    pub async fn write(&self, dist_dir: &Path) -> Result<PathBuf> {
        let path = dist_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write_file(&path, json).await?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Read a manifest back as untyped JSON.
pub async fn read(dist_dir: &Path) -> Result<serde_json::Value> {
    let path = dist_dir.join(MANIFEST_FILE);
    let text = tokio::fs::read_to_string(&path)
        .await
        .fs_context("reading build manifest", &path)?;
    Ok(serde_json::from_str(&text)?)
}
