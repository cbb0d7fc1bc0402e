//! Bundle orchestration.
//!
//! The [`Bundler`] validates every requested target against the filesystem,
//! optionally wipes previous outputs, then drives the external bundler once
//! per target in order. Any failure stops the run.

use crate::bundler::command::{BundleCommand, OutputDirs};
use crate::bundler::error::Error;
use crate::bundler::tool_detection::resolve_program;
use crate::bundler::utils::fs;
use crate::config::{BuildTarget, ProjectConfig, TargetSpec};
use crate::error::{ConfigError, Result};
use std::path::PathBuf;

/// Platform executable suffix (`.exe` on Windows)
pub const EXE_SUFFIX: &str = std::env::consts::EXE_SUFFIX;

/// Output of one successful bundler run
#[derive(Debug, Clone)]
pub struct BundledTarget {
    /// Target that was built
    pub target: BuildTarget,
    /// Binary name from the target spec
    pub binary: String,
    /// `dist/<binary>` directory
    pub output_dir: PathBuf,
    /// `dist/<binary>/<binary><EXE_SUFFIX>`
    pub executable: PathBuf,
}

/// Drives the external bundler for one build.
#[derive(Debug)]
pub struct Bundler<'a> {
    project: &'a ProjectConfig,
    program: PathBuf,
    clean: bool,
}

impl<'a> Bundler<'a> {
    /// Locate the configured bundler program.
    pub fn new(project: &'a ProjectConfig, clean: bool) -> Result<Self> {
        let program = resolve_program(&project.config().bundler.program, project.root())?;
        Ok(Self {
            project,
            program,
            clean,
        })
    }

    /// Resolved bundler executable
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    /// Check that every path `target` references exists.
    pub fn preflight(&self, target: BuildTarget) -> Result<&'a TargetSpec> {
        let spec = self.project.config().target(target)?;
        let name = target.name().to_string();

        let entry = self.project.resolve(&spec.entry_point);
        if !entry.is_file() {
            return Err(ConfigError::MissingEntryPoint {
                target: name,
                path: entry,
            }
            .into());
        }

        for mapping in &spec.data {
            let source = self.project.resolve(&mapping.source);
            if !source.exists() {
                return Err(ConfigError::MissingDataSource {
                    target: name,
                    path: source,
                }
                .into());
            }
        }

        if let Some(icon) = &spec.icon {
            let icon = self.project.resolve(icon);
            if !icon.is_file() {
                return Err(ConfigError::MissingIcon {
                    target: name,
                    path: icon,
                }
                .into());
            }
        }

        log::debug!("Preflight passed for {target} target");
        Ok(spec)
    }

    /// Command line for `target`.
    pub fn command(&self, spec: &TargetSpec) -> BundleCommand {
        let dist = self.project.dist_dir();
        let build = self.project.build_dir();
        let dirs = OutputDirs {
            root: self.project.root(),
            dist: &dist,
            build: &build,
        };
        BundleCommand::for_target(
            &self.program,
            spec,
            &dirs,
            &self.project.config().bundler.extra_args,
            self.clean,
        )
    }

    /// Remove the distribution and work directories.
    pub async fn clean_outputs(&self) -> Result<()> {
        for dir in [self.project.dist_dir(), self.project.build_dir()] {
            log::info!("Removing {}", dir.display());
            fs::remove_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Bundle a single, already preflighted target.
    pub async fn bundle(&self, target: BuildTarget, spec: &TargetSpec) -> Result<BundledTarget> {
        let command = self.command(spec);
        log::info!("Bundling {target} target as '{}'", spec.binary);

        fs::create_dir_all(&self.project.dist_dir(), false).await?;

        let status = command.run(self.project.root()).await?;
        if !status.success() {
            return Err(Error::BundlerFailed {
                program: self.program.display().to_string(),
                binary: spec.binary.clone(),
                code: status.code().unwrap_or(-1),
            }
            .into());
        }

        let output_dir = self.project.dist_dir().join(&spec.binary);
        let executable = output_dir.join(format!("{}{EXE_SUFFIX}", spec.binary));
        if !executable.is_file() {
            return Err(Error::MissingExecutable(executable).into());
        }

        log::info!("Bundled {}", executable.display());
        Ok(BundledTarget {
            target,
            binary: spec.binary.clone(),
            output_dir,
            executable,
        })
    }

    /// Preflight all targets, clean if requested, then bundle each in order.
    pub async fn bundle_all(&self, targets: &[BuildTarget]) -> Result<Vec<BundledTarget>> {
        let specs = targets
            .iter()
            .map(|&target| self.preflight(target).map(|spec| (target, spec)))
            .collect::<Result<Vec<_>>>()?;

        if self.clean {
            self.clean_outputs().await?;
        }

        let mut bundled = Vec::with_capacity(specs.len());
        for (target, spec) in specs {
            bundled.push(self.bundle(target, spec).await?);
        }
        Ok(bundled)
    }
}
