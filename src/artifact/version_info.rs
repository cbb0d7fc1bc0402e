//! `dist/<binary>-version.txt` rendering and parsing.

use crate::config::BuildTarget;
use crate::version::ResolvedVersion;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;
use tokio::process::Command;

/// Field names, in file order
pub const VERSION_FIELD: &str = "Version";
/// Build type field (`GUI` / `CLI`)
pub const BUILD_TYPE_FIELD: &str = "Build Type";
/// RFC 3339 UTC build timestamp
pub const BUILD_DATE_FIELD: &str = "Build Date";
/// `<os>-<arch>`
pub const PLATFORM_FIELD: &str = "Platform";
/// Interpreter version
pub const PYTHON_FIELD: &str = "Python";
/// Release channel
pub const CHANNEL_FIELD: &str = "Channel";
/// Version provenance
pub const SOURCE_FIELD: &str = "Version Source";

/// Value recorded when the interpreter cannot be queried
pub const UNKNOWN_PYTHON: &str = "unknown";

/// Facts shared by every artifact of one build
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Product name heading the file
    pub product: String,
    /// Resolved version
    pub version: ResolvedVersion,
    /// Build start time
    pub built_at: DateTime<Utc>,
    /// Host platform
    pub platform: String,
    /// Interpreter version
    pub python_version: String,
}

impl BuildInfo {
    /// Render the version-info text for `target`.
    pub fn render(&self, target: BuildTarget) -> String {
        let fields = [
            (VERSION_FIELD, self.version.version.clone()),
            (BUILD_TYPE_FIELD, target.build_type().to_string()),
            (
                BUILD_DATE_FIELD,
                self.built_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (PLATFORM_FIELD, self.platform.clone()),
            (PYTHON_FIELD, self.python_version.clone()),
            (CHANNEL_FIELD, self.version.channel().to_string()),
            (SOURCE_FIELD, self.version.source.to_string()),
        ];

        let mut text = format!("{}\n", self.product);
        for (name, value) in fields {
            text.push_str(&format!("{name}: {value}\n"));
        }
        text
    }
}

/// Value of `field` in a version-info text.
pub fn field<'t>(text: &'t str, name: &str) -> Option<&'t str> {
    text.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Host platform as `<os>-<arch>`, e.g. `linux-x86_64`
pub fn host_platform() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Query `<interpreter> --version`.
///
/// Returns the bare version number, or [`UNKNOWN_PYTHON`] if the interpreter
/// cannot be run.
pub async fn detect_python_version(interpreter: &str, work_dir: &Path) -> String {
    let output = Command::new(interpreter)
        .arg("--version")
        .current_dir(work_dir)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            // Python 2 prints the version on stderr
            let text = if output.stdout.is_empty() {
                String::from_utf8_lossy(&output.stderr).into_owned()
            } else {
                String::from_utf8_lossy(&output.stdout).into_owned()
            };
            let version = parse_python_version(&text);
            log::debug!("{interpreter} reports version {version}");
            version
        }
        Ok(output) => {
            log::warn!(
                "{interpreter} --version exited with {:?}; recording '{UNKNOWN_PYTHON}'",
                output.status.code()
            );
            UNKNOWN_PYTHON.to_string()
        }
        Err(e) => {
            log::warn!("Could not run {interpreter}: {e}; recording '{UNKNOWN_PYTHON}'");
            UNKNOWN_PYTHON.to_string()
        }
    }
}

fn parse_python_version(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    let version = line.strip_prefix("Python").unwrap_or(line).trim();
    if version.is_empty() {
        UNKNOWN_PYTHON.to_string()
    } else {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionSource;
    use chrono::TimeZone;

    fn info() -> BuildInfo {
        BuildInfo {
            product: "Wareflow EMS".into(),
            version: ResolvedVersion {
                version: "1.2.3".into(),
                source: VersionSource::FromTag {
                    tag: "v1.2.3".into(),
                },
            },
            built_at: Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap(),
            platform: "linux-x86_64".into(),
            python_version: "3.12.4".into(),
        }
    }

    #[test]
    fn test_render() {
        let text = info().render(BuildTarget::Cli);
        assert_eq!(
            text,
            "Wareflow EMS\n\
             Version: 1.2.3\n\
             Build Type: CLI\n\
             Build Date: 2026-10-19T08:30:00Z\n\
             Platform: linux-x86_64\n\
             Python: 3.12.4\n\
             Channel: release\n\
             Version Source: tag v1.2.3\n"
        );
    }

    #[test]
    fn test_field_lookup() {
        let text = info().render(BuildTarget::Gui);
        assert_eq!(field(&text, VERSION_FIELD), Some("1.2.3"));
        assert_eq!(field(&text, BUILD_TYPE_FIELD), Some("GUI"));
        assert_eq!(field(&text, BUILD_DATE_FIELD), Some("2026-10-19T08:30:00Z"));
        assert_eq!(field(&text, "Missing"), None);
    }

    #[test]
    fn test_parse_python_version() {
        assert_eq!(parse_python_version("Python 3.12.4\n"), "3.12.4");
        assert_eq!(parse_python_version(""), UNKNOWN_PYTHON);
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            detect_python_version("wems-no-such-python", dir.path()).await,
            UNKNOWN_PYTHON
        );
    }
}
