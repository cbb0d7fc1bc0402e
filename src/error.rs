//! Error types for wems_release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wems_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all wems_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Build configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version resolution errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Git query errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Test gate errors
    #[error("Test error: {0}")]
    Test(#[from] TestError),

    /// Smoke test errors
    #[error("Smoke test error: {0}")]
    Smoke(#[from] SmokeError),

    /// Changelog generation errors
    #[error("Changelog error: {0}")]
    Changelog(#[from] ChangelogError),

    /// Pipeline state errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// Build configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Build configuration not found at {path}")]
    NotFound {
        /// Path where the configuration was expected
        path: PathBuf,
    },

    /// Configuration file could not be parsed
    #[error("Malformed build configuration {path}: {reason}")]
    Malformed {
        /// Path to the configuration file
        path: PathBuf,
        /// Parser diagnostic
        reason: String,
    },

    /// Configuration parsed but failed validation
    #[error("Invalid build configuration: {reason}")]
    Invalid {
        /// Reason for the error
        reason: String,
    },

    /// Requested target has no configuration
    #[error("Target '{target}' is not configured in [targets.{target}]")]
    TargetNotConfigured {
        /// Target name
        target: String,
    },

    /// Entry point script is missing
    #[error("Entry point for target '{target}' not found: {path}")]
    MissingEntryPoint {
        /// Target name
        target: String,
        /// Expected entry point path
        path: PathBuf,
    },

    /// Data directory or file to bundle is missing
    #[error("Data source for target '{target}' not found: {path}")]
    MissingDataSource {
        /// Target name
        target: String,
        /// Expected data path
        path: PathBuf,
    },

    /// Icon file is missing
    #[error("Icon for target '{target}' not found: {path}")]
    MissingIcon {
        /// Target name
        target: String,
        /// Expected icon path
        path: PathBuf,
    },

    /// Bundler program could not be located
    #[error("Bundler program '{program}' not found: {reason}")]
    BundlerNotFound {
        /// Program name or path
        program: String,
        /// Reason for the error
        reason: String,
    },
}

/// Version resolution errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Override is not a semantic version
    #[error("Invalid version override '{version}': {source}")]
    InvalidOverride {
        /// Version string as supplied
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },
}

/// Git query errors
#[derive(Error, Debug)]
pub enum GitError {
    /// No repository with a work tree at or above the project
    #[error("Not a git repository: {path}")]
    NotRepository {
        /// Directory that was searched
        path: PathBuf,
    },

    /// A repository read failed
    #[error("Git {operation} failed: {reason}")]
    Query {
        /// What was being read
        operation: &'static str,
        /// Underlying gix error
        reason: String,
    },
}

/// Test gate errors
#[derive(Error, Debug)]
pub enum TestError {
    /// Test runner could not be started
    #[error("Failed to start test runner '{command}': {reason}")]
    SpawnFailed {
        /// Command line
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Test suite failed
    #[error("Test suite failed ({command}) with exit code {code}")]
    Failed {
        /// Command line
        command: String,
        /// Exit code, or -1 if terminated by a signal
        code: i32,
    },
}

/// Smoke test errors
#[derive(Error, Debug)]
pub enum SmokeError {
    /// Executable could not be launched
    #[error("Failed to launch {binary}: {reason}")]
    LaunchFailed {
        /// Executable path
        binary: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Executable exited unsuccessfully
    #[error("{binary} exited with code {code}: {stderr}")]
    NonZeroExit {
        /// Executable path
        binary: PathBuf,
        /// Exit code, or -1 if terminated by a signal
        code: i32,
        /// Captured stderr
        stderr: String,
    },

    /// Executable did not finish in time
    #[error("{binary} did not exit within {seconds}s")]
    TimedOut {
        /// Executable path
        binary: PathBuf,
        /// Timeout in seconds
        seconds: u64,
    },

    /// Expected output not found
    #[error("{binary} output did not contain '{expected}'")]
    UnexpectedOutput {
        /// Executable path
        binary: PathBuf,
        /// Expected substring
        expected: String,
    },
}

/// Changelog generation errors
#[derive(Error, Debug)]
pub enum ChangelogError {
    /// Changelog requires a releasable version
    #[error("Cannot write a changelog section for non-releasable version '{version}'")]
    NonReleasableVersion {
        /// Resolved version string
        version: String,
    },

    /// Reading or writing the changelog failed
    #[error("Failed to {operation} {path}: {source}")]
    Io {
        /// Operation being performed
        operation: &'static str,
        /// Changelog path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Pipeline state errors
#[derive(Error, Debug)]
pub enum StateError {
    /// Attempted a transition the state machine does not allow
    #[error("Invalid pipeline transition from {from} to {to}")]
    InvalidTransition {
        /// Current stage
        from: String,
        /// Requested stage
        to: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::NotFound { .. }) => vec![
                "Create a configuration: wems_release init".to_string(),
                "Point at an existing file with --config <path>".to_string(),
            ],
            ReleaseError::Config(ConfigError::MissingEntryPoint { path, .. }) => vec![
                format!("Check that {} exists", path.display()),
                "Fix entry_point in wems-build.toml (paths are relative to the project)"
                    .to_string(),
            ],
            ReleaseError::Config(ConfigError::BundlerNotFound { .. }) => vec![
                "Install PyInstaller: python -m pip install pyinstaller".to_string(),
                "Or set WEMS_BUNDLER to the bundler executable".to_string(),
            ],
            ReleaseError::Test(TestError::Failed { .. }) => vec![
                "Fix the failing tests and re-run the build".to_string(),
                "Use --skip-tests only if you accept shipping an untested build".to_string(),
            ],
            ReleaseError::Smoke(_) => vec![
                "Run the packaged executable by hand to see the runtime failure".to_string(),
                "Missing modules usually need an entry in hidden_imports".to_string(),
            ],
            ReleaseError::Git(GitError::NotRepository { .. }) => vec![
                "Run the command inside the project's git repository".to_string(),
                "Changelog generation needs history; drop --changelog otherwise".to_string(),
            ],
            ReleaseError::Version(VersionError::InvalidOverride { .. }) => {
                vec!["Pass a semantic version such as --version 1.2.3".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
