//! Bundler command line construction and execution.

use crate::bundler::error::{Error, Result};
use crate::config::{BundleMode, TargetSpec};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Separator between source and destination in `--add-data`
pub const DATA_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Output locations a bundler run writes into
#[derive(Debug, Clone)]
pub struct OutputDirs<'a> {
    /// Project root; relative target paths are resolved against it
    pub root: &'a Path,
    /// Distribution directory (`--distpath`)
    pub dist: &'a Path,
    /// Work directory parent; each target gets `<build>/<binary>`
    pub build: &'a Path,
}

/// One fully resolved bundler invocation
#[derive(Debug, Clone)]
pub struct BundleCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl BundleCommand {
    /// Build the argument vector for `spec`.
    pub fn for_target(
        program: &Path,
        spec: &TargetSpec,
        dirs: &OutputDirs<'_>,
        extra_args: &[String],
        clean: bool,
    ) -> Self {
        let work = dirs.build.join(&spec.binary);
        let resolve = |p: &Path| -> PathBuf {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dirs.root.join(p)
            }
        };

        let mut args: Vec<OsString> = vec![
            "--noconfirm".into(),
            "--onedir".into(),
            "--distpath".into(),
            dirs.dist.into(),
            "--workpath".into(),
            work.clone().into(),
            "--specpath".into(),
            work.into(),
            "--name".into(),
            spec.binary.as_str().into(),
            match spec.mode {
                BundleMode::Windowed => "--windowed".into(),
                BundleMode::Console => "--console".into(),
            },
        ];

        if clean {
            args.push("--clean".into());
        }
        if let Some(icon) = &spec.icon {
            args.push("--icon".into());
            args.push(resolve(icon).into());
        }
        for module in &spec.hidden_imports {
            args.push("--hidden-import".into());
            args.push(module.into());
        }
        for mapping in &spec.data {
            let mut value = OsString::from(resolve(&mapping.source));
            value.push(DATA_SEPARATOR);
            value.push(&mapping.dest);
            args.push("--add-data".into());
            args.push(value);
        }
        for module in &spec.excludes {
            args.push("--exclude-module".into());
            args.push(module.into());
        }
        args.extend(extra_args.iter().map(OsString::from));
        args.push(resolve(&spec.entry_point).into());

        Self {
            program: program.to_path_buf(),
            args,
        }
    }

    /// Command line for logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the bundler with inherited stdio and wait for it.
    pub async fn run(&self, work_dir: &Path) -> Result<ExitStatus> {
        log::debug!("Executing: {}", self.display());

        Command::new(&self.program)
            .args(&self.args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|error| Error::CommandFailed {
                command: self.display(),
                error,
            })
    }
}
