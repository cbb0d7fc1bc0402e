//! Test gate run before bundling.
//!
//! The configured runner is executed once over the whole suite, minus the
//! ignored (display-dependent) paths. Any non-zero exit fails the build.
//! Runner output goes straight to the terminal.

use crate::config::TestSettings;
use crate::error::{Result, TestError};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// All-or-nothing test gate
#[derive(Debug)]
pub struct TestGate<'a> {
    settings: &'a TestSettings,
    work_dir: &'a Path,
}

impl<'a> TestGate<'a> {
    /// Create a gate that runs in `work_dir`
    pub fn new(settings: &'a TestSettings, work_dir: &'a Path) -> Self {
        Self { settings, work_dir }
    }

    /// Full argument vector, program first.
    pub fn command_line(&self) -> Vec<String> {
        let mut argv = self.settings.command.clone();
        argv.extend(self.settings.paths.iter().cloned());
        argv.extend(
            self.settings
                .ignore
                .iter()
                .map(|path| format!("--ignore={path}")),
        );
        argv
    }

    /// Run the suite; `Ok(())` only on exit code 0.
    pub async fn run(&self) -> Result<()> {
        let argv = self.command_line();
        let display = argv.join(" ");
        let Some((program, args)) = argv.split_first() else {
            return Err(TestError::SpawnFailed {
                command: display,
                reason: "empty test command".to_string(),
            }
            .into());
        };

        log::info!("Running test gate: {display}");

        let status = Command::new(program)
            .args(args)
            .current_dir(self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| TestError::SpawnFailed {
                command: display.clone(),
                reason: e.to_string(),
            })?;

        if status.success() {
            log::info!("Test gate passed");
            Ok(())
        } else {
            Err(TestError::Failed {
                command: display,
                code: status.code().unwrap_or(-1),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    fn settings(command: &[&str]) -> TestSettings {
        TestSettings {
            command: command.iter().map(|s| s.to_string()).collect(),
            paths: vec!["tests".into()],
            ignore: vec!["tests/ui".into()],
        }
    }

    #[test]
    fn test_command_line_excludes_ui_tests() {
        let settings = TestSettings::default();
        let gate = TestGate::new(&settings, Path::new("."));
        assert_eq!(
            gate.command_line(),
            vec!["python", "-m", "pytest", "tests", "--ignore=tests/ui"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_passing_suite() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&["sh", "-c", "exit 0"]);
        TestGate::new(&settings, dir.path()).run().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_suite_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&["sh", "-c", "exit 3"]);
        let err = TestGate::new(&settings, dir.path()).run().await.unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Test(TestError::Failed { code: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_runner() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&["wems-no-such-test-runner"]);
        let err = TestGate::new(&settings, dir.path()).run().await.unwrap_err();
        assert!(matches!(err, ReleaseError::Test(TestError::SpawnFailed { .. })));
    }
}
