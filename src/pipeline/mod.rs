//! Release build pipeline.
//!
//! Stages run strictly in order:
//!
//! ```text
//! ResolvingVersion → (Testing) → Bundling → (SmokeTesting) → Finalizing
//!     → (Packaging) → (GeneratingChangelog) → Done
//! ```
//!
//! Stages in parentheses may be skipped. The first error moves the pipeline
//! to `Failed` and is returned unchanged. Smoke tests run before
//! finalization, so an executable that fails to start never gets a sidecar.

mod context;
mod stages;

pub use context::PipelineContext;

use crate::artifact::{ArchiveArtifact, BuildArtifact};
use crate::changelog::WriteOutcome;
use crate::cli::RuntimeConfig;
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::git::GitRepo;
use crate::state::{PipelineStage, PipelineState, format_duration};
use crate::version::ResolvedVersion;
use crate::BuildRequest;
use std::path::PathBuf;

/// Everything a successful build produced
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Version written into the artifacts
    pub version: ResolvedVersion,
    /// One per target, in build order
    pub artifacts: Vec<BuildArtifact>,
    /// Distribution archives, empty unless requested
    pub archives: Vec<ArchiveArtifact>,
    /// `dist/build-manifest.json`
    pub manifest_path: PathBuf,
    /// Changelog result when requested
    pub changelog: Option<WriteOutcome>,
    /// Stage history
    pub state: PipelineState,
}

/// Run a complete build.
pub async fn run_build(
    project: &ProjectConfig,
    request: &BuildRequest,
    config: &RuntimeConfig,
) -> Result<BuildOutcome> {
    let git = match GitRepo::open(project.root()).await {
        Ok(git) => Some(git),
        Err(e) => {
            log::debug!("{e}");
            None
        }
    };

    let ctx = PipelineContext {
        project,
        request,
        config,
        git,
        built_at: chrono::Utc::now(),
    };

    let mut state = PipelineState::new();
    match execute_stages(&ctx, &mut state).await {
        Ok(mut outcome) => {
            state.transition(PipelineStage::Done)?;
            log::info!("Build finished in {}", format_duration(state.elapsed_time()));
            outcome.state = state;
            Ok(outcome)
        }
        Err(e) => {
            let stage = state.current;
            state.fail();
            log::error!("Build failed during {stage}: {e}");
            Err(e)
        }
    }
}

async fn execute_stages(
    ctx: &PipelineContext<'_>,
    state: &mut PipelineState,
) -> Result<BuildOutcome> {
    state.transition(PipelineStage::ResolvingVersion)?;
    let version = stages::resolve_version(ctx).await?;

    if ctx.request.skip_tests {
        log::warn!("Test gate skipped (--skip-tests); this build is untested");
        ctx.config
            .warning_println("Skipping tests (--skip-tests): this build is untested");
    } else {
        state.transition(PipelineStage::Testing)?;
        stages::run_tests(ctx).await?;
    }

    state.transition(PipelineStage::Bundling)?;
    let bundled = stages::bundle(ctx).await?;

    let wants_smoke = bundled.iter().any(|b| {
        ctx.project
            .config()
            .target(b.target)
            .is_ok_and(|spec| spec.smoke.is_some())
    });
    if wants_smoke {
        if ctx.request.skip_smoke {
            log::warn!("Smoke tests skipped (--skip-smoke)");
            ctx.config.warning_println("Skipping smoke tests (--skip-smoke)");
        } else {
            state.transition(PipelineStage::SmokeTesting)?;
            stages::smoke_test(ctx, &bundled).await?;
        }
    }

    state.transition(PipelineStage::Finalizing)?;
    let info = stages::build_info(ctx, &version).await;
    let artifacts = stages::finalize(ctx, &info, &bundled).await?;

    let archives = if ctx.request.archive {
        state.transition(PipelineStage::Packaging)?;
        stages::package(ctx, &version, &artifacts).await?
    } else {
        Vec::new()
    };

    let manifest_path = stages::write_manifest(ctx, &info, &artifacts, &archives).await?;

    let changelog = if !ctx.request.changelog {
        None
    } else if !version.is_releasable() {
        log::warn!("Not writing a changelog section for {} build {version}", version.channel());
        ctx.config.warning_println(&format!(
            "Changelog skipped: {version} is not a release version"
        ));
        None
    } else {
        state.transition(PipelineStage::GeneratingChangelog)?;
        Some(stages::changelog(ctx, &version).await?)
    };

    Ok(BuildOutcome {
        version,
        artifacts,
        archives,
        manifest_path,
        changelog,
        state: PipelineState::default(),
    })
}
