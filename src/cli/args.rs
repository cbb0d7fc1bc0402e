//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release builds for Wareflow EMS
#[derive(Parser, Debug)]
#[command(
    name = "wems_release",
    version,
    about = "Release build pipeline for Wareflow EMS",
    long_about = "Build versioned, checksummed standalone executables of Wareflow EMS.

Usage:
  wems_release build                  # GUI executable
  wems_release build --all --clean    # GUI and CLI executables from scratch
  wems_release changelog --dry-run    # Preview the next changelog section
  wems_release verify                 # Re-check checksums in dist/"
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Show detailed progress
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project directory
    #[arg(long, global = true, env = "WEMS_PROJECT_DIR", default_value = ".")]
    pub project: PathBuf,

    /// Build configuration file (default: <project>/wems-build.toml)
    #[arg(long, global = true, env = "WEMS_BUILD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bundler program, overriding [bundler].program
    #[arg(long, global = true, env = "WEMS_BUNDLER", hide = true)]
    pub bundler: Option<String>,

    /// Python interpreter, overriding [python].interpreter
    #[arg(long, global = true, env = "WEMS_PYTHON", hide = true)]
    pub python: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build standalone executables
    #[command(disable_version_flag = true)]
    Build {
        /// Build the console executable instead of the GUI
        #[arg(long, conflicts_with = "all")]
        cli: bool,

        /// Build both executables
        #[arg(long)]
        all: bool,

        /// Remove dist/ and build/ before bundling
        #[arg(long)]
        clean: bool,

        /// Do not run the test suite first
        #[arg(long)]
        skip_tests: bool,

        /// Version to stamp instead of the one derived from git
        #[arg(long = "version", value_name = "SEMVER")]
        version_override: Option<String>,

        /// Do not launch the bundled executables
        #[arg(long)]
        skip_smoke: bool,

        /// Create distribution archives
        #[arg(long)]
        archive: bool,

        /// Prepend a CHANGELOG.md section for this version
        #[arg(long)]
        changelog: bool,
    },

    /// Generate the changelog section for a release
    #[command(disable_version_flag = true)]
    Changelog {
        /// Version heading the section (default: derived from git)
        #[arg(long = "version", value_name = "SEMVER")]
        version_override: Option<String>,

        /// Start of the commit range (default: previous release tag)
        #[arg(long, value_name = "REV")]
        since: Option<String>,

        /// Replace an existing section for the same version
        #[arg(long)]
        overwrite: bool,

        /// Also write the section body to this file as release notes
        #[arg(long, value_name = "FILE")]
        notes: Option<PathBuf>,

        /// Print the section without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify checksum sidecars in the distribution directory
    Verify,

    /// Print the version a build would use
    Version,

    /// Write a starter wems-build.toml
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build { .. } => "build",
            Command::Changelog { .. } => "changelog",
            Command::Verify => "verify",
            Command::Version => "version",
            Command::Init { .. } => "init",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.project.as_os_str().is_empty() {
            return Err("Project directory must not be empty".to_string());
        }
        if let Command::Changelog {
            notes: Some(notes), ..
        } = &self.command
            && notes.as_os_str().is_empty()
        {
            return Err("--notes requires a file path".to_string());
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

// Terminal write failures are not worth aborting a build over.
impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message (only with --verbose)
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_build_defaults() {
        let args = Args::try_parse_from(["wems_release", "build"]).unwrap();
        match args.command {
            Command::Build {
                cli,
                all,
                clean,
                skip_tests,
                version_override,
                ..
            } => {
                assert!(!cli && !all && !clean && !skip_tests);
                assert!(version_override.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_conflicts_with_all() {
        assert!(Args::try_parse_from(["wems_release", "build", "--cli", "--all"]).is_err());
    }

    #[test]
    fn test_build_version_override() {
        let args =
            Args::try_parse_from(["wems_release", "build", "--version", "v9.9.9", "--clean"])
                .unwrap();
        match args.command {
            Command::Build {
                version_override,
                clean,
                ..
            } => {
                assert_eq!(version_override.as_deref(), Some("v9.9.9"));
                assert!(clean);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["wems_release", "verify", "--project", "/tmp/wems", "-v"])
                .unwrap();
        assert_eq!(args.project, PathBuf::from("/tmp/wems"));
        assert!(args.verbose);
        assert_eq!(args.command.name(), "verify");
    }
}
