//! Shared helpers for command implementations.

use crate::cli::Args;
use crate::config::ProjectConfig;
use crate::error::{CliError, Result};
use path_absolutize::Absolutize;
use std::path::PathBuf;

/// Absolute project directory from `--project`.
///
/// Relative paths would otherwise be resolved twice once child processes
/// run with the project as their working directory.
pub fn project_root(args: &Args) -> Result<PathBuf> {
    let root = args
        .project
        .absolutize()
        .map_err(|e| CliError::InvalidArguments {
            reason: format!("invalid project directory {}: {e}", args.project.display()),
        })?
        .into_owned();
    if !root.is_dir() {
        return Err(CliError::InvalidArguments {
            reason: format!("project directory {} does not exist", root.display()),
        }
        .into());
    }
    Ok(root)
}

/// Load the build configuration with environment overrides applied.
pub async fn load_project(args: &Args) -> Result<ProjectConfig> {
    let root = project_root(args)?;
    let project = ProjectConfig::load(&root, args.config.as_deref())
        .await?
        .with_overrides(args.bundler.clone(), args.python.clone());
    Ok(project)
}
