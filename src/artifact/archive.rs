//! Distribution archives.
//!
//! Each finalized target directory is packed together with its version-info
//! file into `dist/<binary>-<version>-<platform>.<ext>`, and the archive gets
//! its own checksum sidecar.

use super::BuildArtifact;
use crate::bundler::checksum;
use crate::bundler::error::{Context, Error, ErrorExt, Result};
use crate::config::{ArchiveFormat, BuildTarget};
use flate2::{Compression, write::GzEncoder};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A packed distribution archive
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveArtifact {
    /// Target the archive contains
    pub target: BuildTarget,
    /// Archive path
    pub path: PathBuf,
    /// Archive size
    pub size_bytes: u64,
    /// Lowercase hex SHA-256 of the archive
    pub checksum: String,
}

/// File name for an archive of `binary`
pub fn archive_name(binary: &str, version: &str, platform: &str, format: ArchiveFormat) -> String {
    format!("{binary}-{version}-{platform}.{}", format.extension())
}

/// Pack `artifact`'s directory and version-info file.
pub async fn package(
    artifact: &BuildArtifact,
    dist_dir: &Path,
    version: &str,
    format: ArchiveFormat,
) -> Result<ArchiveArtifact> {
    let source_dir = artifact
        .binary_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::MissingExecutable(artifact.binary_path.clone()))?;
    let dest = dist_dir.join(archive_name(
        &artifact.binary,
        version,
        &artifact.platform,
        format,
    ));

    log::info!("Packaging {}", dest.display());

    let file = tokio::fs::File::create(&dest)
        .await
        .fs_context("creating archive", &dest)?;
    let std_file = file.into_std().await;

    let prefix = PathBuf::from(&artifact.binary);
    let version_info = artifact.version_info_path.clone();

    let packed = tokio::task::spawn_blocking(move || match format {
        ArchiveFormat::TarGz => write_tar_gz(std_file, &source_dir, &prefix, &version_info),
        ArchiveFormat::Zip => write_zip(std_file, &source_dir, &prefix, &version_info),
    })
    .await
    .map_err(|e| Error::GenericError(format!("Join error: {e}")))?;
    packed.with_context(|| format!("packaging {}", dest.display()))?;

    let (checksum, _) = checksum::write_sidecar(&dest).await?;
    let size_bytes = crate::bundler::utils::fs::file_size(&dest).await?;

    Ok(ArchiveArtifact {
        target: artifact.target,
        path: dest,
        size_bytes,
        checksum,
    })
}

fn write_tar_gz(
    file: std::fs::File,
    source_dir: &Path,
    prefix: &Path,
    version_info: &Path,
) -> Result<()> {
    let enc = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let rel_path = prefix.join(path.strip_prefix(source_dir)?);

        let metadata = std::fs::metadata(path)?;
        let mut header = tar::Header::new_gnu();
        header.set_metadata_in_mode(&metadata, tar::HeaderMode::Deterministic);

        if entry.file_type().is_dir() {
            tar.append_data(&mut header, &rel_path, &mut io::empty())?;
        } else {
            let mut file = std::fs::File::open(path)?;
            tar.append_data(&mut header, &rel_path, &mut file)?;
        }
    }

    if let Some(name) = version_info.file_name() {
        let metadata = std::fs::metadata(version_info)?;
        let mut header = tar::Header::new_gnu();
        header.set_metadata_in_mode(&metadata, tar::HeaderMode::Deterministic);
        let mut file = std::fs::File::open(version_info)?;
        tar.append_data(&mut header, name, &mut file)?;
    }

    let enc = tar.into_inner()?;
    let mut finished = enc.finish()?;
    finished.flush()?;
    Ok(())
}

fn write_zip(
    file: std::fs::File,
    source_dir: &Path,
    prefix: &Path,
    version_info: &Path,
) -> Result<()> {
    use zip::write::SimpleFileOptions;

    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let rel_path = prefix.join(path.strip_prefix(source_dir)?);
        let name = rel_path.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            let options = options.unix_permissions(file_mode(&entry.metadata()?));
            zip.start_file(name, options)?;
            let mut file = std::fs::File::open(path)?;
            io::copy(&mut file, &mut zip)?;
        }
    }

    if let Some(name) = version_info.file_name() {
        zip.start_file(name.to_string_lossy().into_owned(), options)?;
        let mut file = std::fs::File::open(version_info)?;
        io::copy(&mut file, &mut zip)?;
    }

    let mut finished = zip.finish()?;
    finished.flush()?;
    Ok(())
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn file_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o755
}
