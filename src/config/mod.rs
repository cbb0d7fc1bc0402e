//! Build configuration loaded from `wems-build.toml`.
//!
//! The configuration replaces free-form bundler spec scripts with a validated
//! structure. Unknown keys are rejected at parse time and every target is
//! checked before any external tool runs.
//!
//! ```toml
//! [targets.cli]
//! binary = "wems-cli"
//! entry_point = "src/cli.py"
//! mode = "console"
//! hidden_imports = ["openpyxl"]
//! ```

mod target;

pub use target::{BuildTarget, TargetSelection};

use crate::error::{ConfigError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default configuration file name, looked up in the project directory
pub const DEFAULT_CONFIG_FILE: &str = "wems-build.toml";

/// Template written by `wems_release init`
pub const CONFIG_TEMPLATE: &str = include_str!("../../templates/wems-build.toml");

static PYTHON_MODULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("python module regex is valid")
});

/// Complete build configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Output locations and product naming
    #[serde(default)]
    pub project: ProjectSettings,
    /// External bundler
    #[serde(default)]
    pub bundler: BundlerSettings,
    /// Interpreter queried for version info
    #[serde(default)]
    pub python: PythonSettings,
    /// Test gate
    #[serde(default)]
    pub tests: TestSettings,
    /// Target specifications
    pub targets: Targets,
}

/// `[project]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProjectSettings {
    /// Product name written into version-info files
    pub name: String,
    /// Distribution directory
    pub dist_dir: PathBuf,
    /// Bundler work directory
    pub build_dir: PathBuf,
    /// Persisted changelog
    pub changelog: PathBuf,
    /// Archive format for `--archive` (platform default when unset)
    pub archive_format: Option<ArchiveFormat>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            name: "Wareflow EMS".to_string(),
            dist_dir: PathBuf::from("dist"),
            build_dir: PathBuf::from("build"),
            changelog: PathBuf::from("CHANGELOG.md"),
            archive_format: None,
        }
    }
}

/// Distribution archive format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ArchiveFormat {
    /// gzip-compressed tarball
    #[serde(rename = "tar.gz")]
    TarGz,
    /// zip archive
    #[serde(rename = "zip")]
    Zip,
}

impl ArchiveFormat {
    /// Native format of the host platform
    pub fn host_default() -> Self {
        if cfg!(windows) {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::TarGz
        }
    }

    /// File extension without leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Zip => "zip",
        }
    }
}

/// `[bundler]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BundlerSettings {
    /// Program name on PATH, or a path relative to the project
    pub program: String,
    /// Extra arguments inserted before the entry point
    pub extra_args: Vec<String>,
}

impl Default for BundlerSettings {
    fn default() -> Self {
        Self {
            program: "pyinstaller".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// `[python]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PythonSettings {
    /// Interpreter invoked with `--version`
    pub interpreter: String,
}

impl Default for PythonSettings {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
        }
    }
}

/// `[tests]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TestSettings {
    /// Test runner command
    pub command: Vec<String>,
    /// Test paths passed to the runner
    pub paths: Vec<String>,
    /// Paths excluded from the gate, passed as `--ignore=<path>`
    pub ignore: Vec<String>,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            command: vec!["python".into(), "-m".into(), "pytest".into()],
            paths: vec!["tests".into()],
            ignore: vec!["tests/ui".into()],
        }
    }
}

/// `[targets]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Targets {
    /// `[targets.gui]`
    pub gui: Option<TargetSpec>,
    /// `[targets.cli]`
    pub cli: Option<TargetSpec>,
}

/// Window mode of a bundled executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleMode {
    /// No console window (`--windowed`)
    Windowed,
    /// Console application (`--console`)
    Console,
}

/// Declarative specification of one executable
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    /// Executable and output directory name
    pub binary: String,
    /// Script the bundler starts from
    pub entry_point: PathBuf,
    /// Window mode
    pub mode: BundleMode,
    /// Modules the bundler's import analysis cannot discover
    #[serde(default)]
    pub hidden_imports: Vec<String>,
    /// Files and directories copied verbatim into the bundle
    #[serde(default)]
    pub data: Vec<DataMapping>,
    /// Packages excluded to shrink the bundle
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Application icon
    #[serde(default)]
    pub icon: Option<PathBuf>,
    /// Post-build launch check
    #[serde(default)]
    pub smoke: Option<SmokeCheck>,
}

/// One `[[targets.<t>.data]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataMapping {
    /// Source path relative to the project
    pub source: PathBuf,
    /// Destination directory inside the bundle
    pub dest: String,
}

/// `[targets.<t>.smoke]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmokeCheck {
    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,
    /// Seconds before the executable is killed
    #[serde(default = "default_smoke_timeout")]
    pub timeout_secs: u64,
    /// Substring required in stdout or stderr
    #[serde(default)]
    pub expect_output: Option<String>,
}

fn default_smoke_timeout() -> u64 {
    30
}

impl BuildConfig {
    /// Parse and validate configuration text.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let config: BuildConfig = toml::from_str(text).map_err(|e| ConfigError::Malformed {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a target specification.
    pub fn target(&self, target: BuildTarget) -> Result<&TargetSpec> {
        let spec = match target {
            BuildTarget::Gui => self.targets.gui.as_ref(),
            BuildTarget::Cli => self.targets.cli.as_ref(),
        };
        spec.ok_or_else(|| {
            ConfigError::TargetNotConfigured {
                target: target.name().to_string(),
            }
            .into()
        })
    }

    /// Structural validation that does not touch the filesystem.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ConfigError::Invalid { reason };

        if self.targets.gui.is_none() && self.targets.cli.is_none() {
            return Err(invalid("at least one of [targets.gui] or [targets.cli] is required".into()).into());
        }
        if self.bundler.program.trim().is_empty() {
            return Err(invalid("bundler.program must not be empty".into()).into());
        }
        if self.tests.command.is_empty() {
            return Err(invalid("tests.command must not be empty".into()).into());
        }

        for (name, spec) in [("gui", &self.targets.gui), ("cli", &self.targets.cli)] {
            let Some(spec) = spec else { continue };
            let binary = spec.binary.as_str();
            if binary.is_empty()
                || binary == "."
                || binary == ".."
                || binary.contains(['/', '\\'])
            {
                return Err(invalid(format!(
                    "targets.{name}.binary '{binary}' must be a plain file name"
                ))
                .into());
            }
            for module in spec.hidden_imports.iter().chain(&spec.excludes) {
                if !PYTHON_MODULE_RE.is_match(module) {
                    return Err(invalid(format!(
                        "targets.{name}: '{module}' is not a valid module name"
                    ))
                    .into());
                }
            }
            if let Some(mapping) = spec.data.iter().find(|m| m.dest.trim().is_empty()) {
                return Err(invalid(format!(
                    "targets.{name}.data: destination for '{}' must not be empty",
                    mapping.source.display()
                ))
                .into());
            }
            if spec.smoke.as_ref().is_some_and(|s| s.timeout_secs == 0) {
                return Err(invalid(format!(
                    "targets.{name}.smoke.timeout_secs must be greater than zero"
                ))
                .into());
            }
        }

        if let (Some(gui), Some(cli)) = (&self.targets.gui, &self.targets.cli)
            && gui.binary == cli.binary
        {
            return Err(invalid(format!(
                "gui and cli targets share the binary name '{}'",
                gui.binary
            ))
            .into());
        }

        Ok(())
    }
}

/// Configuration bound to the project directory it was loaded for.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    root: PathBuf,
    config_path: PathBuf,
    config: BuildConfig,
}

impl ProjectConfig {
    /// Load `config_path` (default `<root>/wems-build.toml`).
    pub async fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => root.join(p),
            None => root.join(DEFAULT_CONFIG_FILE),
        };

        let text = match tokio::fs::read_to_string(&config_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound { path: config_path }.into());
            }
            Err(e) => return Err(e.into()),
        };

        let config = BuildConfig::parse(&text, &config_path)?;
        log::debug!("Loaded build configuration from {}", config_path.display());

        Ok(Self::from_parts(root.to_path_buf(), config_path, config))
    }

    /// Bind an already parsed configuration to a project directory.
    pub fn from_parts(root: PathBuf, config_path: PathBuf, config: BuildConfig) -> Self {
        Self {
            root,
            config_path,
            config,
        }
    }

    /// Apply `WEMS_BUNDLER` / `WEMS_PYTHON` style overrides.
    pub fn with_overrides(mut self, bundler: Option<String>, python: Option<String>) -> Self {
        if let Some(program) = bundler {
            log::debug!("Bundler program overridden: {program}");
            self.config.bundler.program = program;
        }
        if let Some(interpreter) = python {
            log::debug!("Python interpreter overridden: {interpreter}");
            self.config.python.interpreter = interpreter;
        }
        self
    }

    /// Parsed configuration
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Project directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File the configuration was read from
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Resolve a project-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Absolute distribution directory
    pub fn dist_dir(&self) -> PathBuf {
        self.resolve(&self.config.project.dist_dir)
    }

    /// Absolute bundler work directory
    pub fn build_dir(&self) -> PathBuf {
        self.resolve(&self.config.project.build_dir)
    }

    /// Absolute changelog path
    pub fn changelog_path(&self) -> PathBuf {
        self.resolve(&self.config.project.changelog)
    }

    /// Archive format for `--archive`
    pub fn archive_format(&self) -> ArchiveFormat {
        self.config
            .project
            .archive_format
            .unwrap_or_else(ArchiveFormat::host_default)
    }
}
