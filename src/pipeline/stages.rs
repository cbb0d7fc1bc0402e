//! Individual pipeline stages.

use crate::artifact::{self, ArchiveArtifact, BuildArtifact, BuildInfo, BuildManifest, Finalizer};
use crate::bundler::{BundledTarget, Bundler};
use crate::changelog::{ChangelogGenerator, WriteOutcome, write_entry};
use crate::error::{GitError, Result};
use crate::gate::TestGate;
use crate::smoke;
use crate::version::{ResolvedVersion, VersionResolver};
use std::path::PathBuf;

use super::context::PipelineContext;

/// Determine the build version.
pub async fn resolve_version(ctx: &PipelineContext<'_>) -> Result<ResolvedVersion> {
    ctx.config.println("🔍 Resolving version...");
    let resolved = VersionResolver::new(ctx.git.as_ref())
        .resolve(ctx.request.version_override.as_deref())
        .await?;

    if resolved.is_releasable() {
        ctx.config
            .success_println(&format!("Version {} ({})", resolved, resolved.source));
    } else {
        ctx.config.warning_println(&format!(
            "Version {} ({}) is {}",
            resolved,
            resolved.source,
            resolved.channel()
        ));
    }

    // Fail before bundling rather than after the artifacts exist
    if ctx.request.changelog && resolved.is_releasable() && ctx.git.is_none() {
        return Err(GitError::NotRepository {
            path: ctx.project.root().to_path_buf(),
        }
        .into());
    }
    Ok(resolved)
}

/// Run the test gate.
pub async fn run_tests(ctx: &PipelineContext<'_>) -> Result<()> {
    ctx.config.println("🧪 Running tests...");
    TestGate::new(&ctx.project.config().tests, ctx.project.root())
        .run()
        .await?;
    ctx.config.success_println("Tests passed");
    Ok(())
}

/// Preflight, optionally clean, and bundle every requested target.
pub async fn bundle(ctx: &PipelineContext<'_>) -> Result<Vec<BundledTarget>> {
    let targets = ctx.request.targets.targets();
    let bundler = Bundler::new(ctx.project, ctx.request.clean)?;
    ctx.config
        .verbose_println(&format!("Bundler: {}", bundler.program().display()));

    if ctx.request.clean {
        ctx.config.println("🧹 Clean build: previous dist/ and build/ will be removed");
    }
    ctx.config.println(&format!(
        "📦 Bundling {}...",
        targets
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let bundled = bundler.bundle_all(&targets).await?;
    for target in &bundled {
        ctx.config
            .success_println(&format!("Bundled {}", target.executable.display()));
    }
    Ok(bundled)
}

/// Launch every bundled executable that has a smoke check.
pub async fn smoke_test(ctx: &PipelineContext<'_>, bundled: &[BundledTarget]) -> Result<()> {
    for target in bundled {
        let spec = ctx.project.config().target(target.target)?;
        let Some(check) = &spec.smoke else {
            continue;
        };
        ctx.config
            .println(&format!("🔥 Smoke testing {}...", target.binary));
        let report = smoke::run(&target.executable, check).await?;
        ctx.config.success_println(&format!(
            "{} started cleanly ({:.1}s)",
            target.binary,
            report.elapsed.as_secs_f64()
        ));
    }
    Ok(())
}

/// Facts recorded in every version-info file.
pub async fn build_info(ctx: &PipelineContext<'_>, version: &ResolvedVersion) -> BuildInfo {
    let python_version = artifact::detect_python_version(
        &ctx.project.config().python.interpreter,
        ctx.project.root(),
    )
    .await;

    BuildInfo {
        product: ctx.project.config().project.name.clone(),
        version: version.clone(),
        built_at: ctx.built_at,
        platform: artifact::host_platform(),
        python_version,
    }
}

/// Write checksum sidecars and version-info files.
pub async fn finalize(
    ctx: &PipelineContext<'_>,
    info: &BuildInfo,
    bundled: &[BundledTarget],
) -> Result<Vec<BuildArtifact>> {
    ctx.config.println("🔐 Finalizing artifacts...");
    let dist = ctx.project.dist_dir();
    let finalizer = Finalizer::new(&dist, info);

    let mut artifacts = Vec::with_capacity(bundled.len());
    for target in bundled {
        let artifact = finalizer.finalize(target).await?;
        ctx.config.success_println(&format!(
            "{} ({} bytes)",
            artifact.binary_path.display(),
            artifact.size_bytes
        ));
        ctx.config.indent(&format!("sha256: {}", artifact.checksum));
        artifacts.push(artifact);
    }
    Ok(artifacts)
}

/// Pack each artifact into a distribution archive.
pub async fn package(
    ctx: &PipelineContext<'_>,
    version: &ResolvedVersion,
    artifacts: &[BuildArtifact],
) -> Result<Vec<ArchiveArtifact>> {
    let format = ctx.project.archive_format();
    let dist = ctx.project.dist_dir();
    ctx.config
        .println(&format!("🗜  Packaging .{} archives...", format.extension()));

    let mut archives = Vec::with_capacity(artifacts.len());
    for built in artifacts {
        let archive = artifact::package(built, &dist, &version.version, format).await?;
        ctx.config.success_println(&format!(
            "{} ({} bytes)",
            archive.path.display(),
            archive.size_bytes
        ));
        archives.push(archive);
    }
    Ok(archives)
}

/// Record the run in `dist/build-manifest.json`.
pub async fn write_manifest(
    ctx: &PipelineContext<'_>,
    info: &BuildInfo,
    artifacts: &[BuildArtifact],
    archives: &[ArchiveArtifact],
) -> Result<PathBuf> {
    let manifest = BuildManifest::new(
        info,
        ctx.request.skip_tests,
        artifacts.to_vec(),
        archives.to_vec(),
    );
    let path = manifest.write(&ctx.project.dist_dir()).await?;
    ctx.config
        .verbose_println(&format!("Manifest: {} ({})", path.display(), manifest.build_id));
    Ok(path)
}

/// Prepend the changelog section for `version`.
pub async fn changelog(
    ctx: &PipelineContext<'_>,
    version: &ResolvedVersion,
) -> Result<WriteOutcome> {
    let git = ctx.git.as_ref().ok_or_else(|| GitError::NotRepository {
        path: ctx.project.root().to_path_buf(),
    })?;

    ctx.config.println("📝 Updating changelog...");
    let entry = ChangelogGenerator::new(git)
        .generate(version, None, ctx.built_at.date_naive())
        .await?;

    let path = ctx.project.changelog_path();
    let outcome = write_entry(&path, &entry, false).await?;
    match outcome {
        WriteOutcome::AlreadyPresent => ctx.config.warning_println(&format!(
            "{} already has a section for {}; left unchanged",
            path.display(),
            version
        )),
        _ => ctx.config.success_println(&format!(
            "Added {} change(s) for {} to {}",
            entry.len(),
            version,
            path.display()
        )),
    }
    Ok(outcome)
}
