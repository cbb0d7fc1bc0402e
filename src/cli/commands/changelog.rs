//! Changelog command implementation.

use crate::changelog::{ChangelogGenerator, WriteOutcome, write_entry};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::DEFAULT_CONFIG_FILE;
use crate::config::ProjectConfig;
use crate::error::{ChangelogError, ConfigError, ReleaseError, Result};
use crate::git::GitRepo;
use crate::version::VersionResolver;
use std::path::PathBuf;

use super::helpers::project_root;

/// Execute the changelog command
pub async fn execute_changelog(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Changelog {
        version_override,
        since,
        overwrite,
        notes,
        dry_run,
    } = &args.command
    else {
        return Ok(1);
    };

    let root = project_root(args)?;
    let changelog_path = changelog_path(args, &root).await?;

    let git = GitRepo::open(&root).await?;
    let version = VersionResolver::new(Some(&git))
        .resolve(version_override.as_deref())
        .await?;

    let entry = ChangelogGenerator::new(&git)
        .generate(&version, since.as_deref(), chrono::Utc::now().date_naive())
        .await?;

    if *dry_run {
        config.verbose_println(&format!("Dry run; {} not modified", changelog_path.display()));
        // The section itself is the command's output, so it bypasses --quiet
        print!("{}", entry.render());
        return Ok(0);
    }

    if let Some(notes) = notes {
        let notes_path = if notes.is_absolute() {
            notes.clone()
        } else {
            root.join(notes)
        };
        tokio::fs::write(&notes_path, entry.render_notes())
            .await
            .map_err(|source| ChangelogError::Io {
                operation: "write",
                path: notes_path.clone(),
                source,
            })?;
        config.success_println(&format!("Release notes written to {}", notes_path.display()));
    }

    match write_entry(&changelog_path, &entry, *overwrite).await? {
        WriteOutcome::Written => config.success_println(&format!(
            "Added {} ({} change(s)) to {}",
            version,
            entry.len(),
            changelog_path.display()
        )),
        WriteOutcome::Replaced => config.success_println(&format!(
            "Replaced the {} section in {}",
            version,
            changelog_path.display()
        )),
        WriteOutcome::AlreadyPresent => config.warning_println(&format!(
            "{} already has a section for {}; use --overwrite to regenerate it",
            changelog_path.display(),
            version
        )),
    }

    Ok(0)
}

/// Changelog location from the build configuration, or the default when the
/// project has no configuration file.
async fn changelog_path(args: &Args, root: &std::path::Path) -> Result<PathBuf> {
    match ProjectConfig::load(root, args.config.as_deref()).await {
        Ok(project) => Ok(project.changelog_path()),
        Err(ReleaseError::Config(ConfigError::NotFound { .. })) => {
            log::debug!("No {DEFAULT_CONFIG_FILE}; using {}/CHANGELOG.md", root.display());
            Ok(root.join("CHANGELOG.md"))
        }
        Err(e) => Err(e),
    }
}
