//! Build command implementation.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::TargetSelection;
use crate::error::Result;
use crate::pipeline::run_build;
use crate::state::format_duration;
use crate::BuildRequest;

use super::helpers::load_project;

/// Build request from the `build` subcommand flags
pub fn build_request(command: &Command) -> Option<BuildRequest> {
    let Command::Build {
        cli,
        all,
        clean,
        skip_tests,
        version_override,
        skip_smoke,
        archive,
        changelog,
    } = command
    else {
        return None;
    };

    Some(BuildRequest {
        targets: TargetSelection::from_flags(*cli, *all),
        clean: *clean,
        skip_tests: *skip_tests,
        version_override: version_override.clone(),
        skip_smoke: *skip_smoke,
        archive: *archive,
        changelog: *changelog,
    })
}

/// Execute the build command
pub async fn execute_build(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Some(request) = build_request(&args.command) else {
        return Ok(1);
    };
    let project = load_project(args).await?;

    config.section("Wareflow EMS build");
    config.verbose_println(&format!("Project: {}", project.root().display()));
    config.verbose_println(&format!("Config: {}", project.config_path().display()));

    let outcome = run_build(&project, &request, config).await?;

    config.section("Summary");
    config.success_println(&format!(
        "Built {} artifact(s) for version {} in {}",
        outcome.artifacts.len(),
        outcome.version,
        format_duration(outcome.state.elapsed_time())
    ));
    for artifact in &outcome.artifacts {
        config.indent(&format!(
            "{} [{}] {}",
            artifact.binary_path.display(),
            artifact.target.build_type(),
            artifact.checksum
        ));
    }
    for archive in &outcome.archives {
        config.indent(&format!("{} {}", archive.path.display(), archive.checksum));
    }
    config.verbose_println(&format!("Manifest: {}", outcome.manifest_path.display()));

    Ok(0)
}
