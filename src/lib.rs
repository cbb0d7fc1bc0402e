//! # wems_release
//!
//! Release build pipeline for the Wareflow EMS desktop application.
//!
//! Turns the application's Python sources into versioned, checksummed
//! standalone executables by driving an external bundler (PyInstaller), and
//! keeps the project changelog in step with tagged releases.
//!
//! ## Features
//!
//! - **Version Resolution**: Semantic version from tags, `dev-<hash>` for untagged commits
//! - **Test Gate**: Test suite must pass before anything is bundled
//! - **Declarative Targets**: Validated TOML instead of free-form bundler spec scripts
//! - **Smoke Tests**: Bundled executables are launched before they are trusted
//! - **Integrity**: SHA-256 sidecars recomputed from disk on every build
//! - **Changelog**: Conventional commits grouped into release sections
//!
//! ## Usage
//!
//! ```bash
//! wems_release build                     # GUI executable, tests first
//! wems_release build --all --clean       # Both executables from scratch
//! wems_release build --cli --version 1.2.3 --skip-tests
//! wems_release changelog --dry-run       # Preview the next changelog section
//! wems_release verify                    # Re-check sidecars in dist/
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod artifact;
pub mod bundler;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod git;
pub mod pipeline;
pub mod smoke;
pub mod state;
pub mod version;

// Re-export main types for public API
pub use artifact::{ArchiveArtifact, BuildArtifact, BuildManifest};
pub use bundler::{BundledTarget, Bundler};
pub use changelog::{ChangelogEntry, ChangelogGenerator};
pub use cli::Args;
pub use config::{BuildTarget, ProjectConfig, TargetSelection};
pub use error::{CliError, ReleaseError, Result};
pub use git::{GitRepo, GitOperations};
pub use pipeline::{BuildOutcome, run_build};
pub use state::{PipelineStage, PipelineState};
pub use version::{ResolvedVersion, VersionResolver};

/// One `build` invocation
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    /// Targets to build
    pub targets: TargetSelection,
    /// Remove previous outputs before bundling
    pub clean: bool,
    /// Bypass the test gate
    pub skip_tests: bool,
    /// Explicit version, `v` prefix allowed
    pub version_override: Option<String>,
    /// Bypass smoke tests
    pub skip_smoke: bool,
    /// Create distribution archives
    pub archive: bool,
    /// Prepend a changelog section for the version
    pub changelog: bool,
}
