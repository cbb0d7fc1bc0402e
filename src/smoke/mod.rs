//! Post-bundle launch check.
//!
//! A bundled executable that builds but cannot import its own modules is the
//! most common packaging failure. Each target that configures a
//! `[targets.<t>.smoke]` table is launched once with the configured arguments
//! and must exit 0 within its timeout.

use crate::config::SmokeCheck;
use crate::error::{Result, SmokeError};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured output of a passing check
#[derive(Debug, Clone)]
pub struct SmokeReport {
    /// Trimmed stdout
    pub stdout: String,
    /// Wall-clock duration
    pub elapsed: Duration,
}

/// Launch `executable` and apply `check`.
pub async fn run(executable: &Path, check: &SmokeCheck) -> Result<SmokeReport> {
    log::info!(
        "Smoke testing {} {}",
        executable.display(),
        check.args.join(" ")
    );
    let started = std::time::Instant::now();

    let child = Command::new(executable)
        .args(&check.args)
        .current_dir(executable.parent().unwrap_or(Path::new(".")))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SmokeError::LaunchFailed {
            binary: executable.to_path_buf(),
            reason: e.to_string(),
        })?;

    // On timeout the future is dropped, which drops the child and kills it.
    let output = tokio::time::timeout(
        Duration::from_secs(check.timeout_secs),
        child.wait_with_output(),
    )
    .await
    .map_err(|_| SmokeError::TimedOut {
        binary: executable.to_path_buf(),
        seconds: check.timeout_secs,
    })?
    .map_err(|e| SmokeError::LaunchFailed {
        binary: executable.to_path_buf(),
        reason: e.to_string(),
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(SmokeError::NonZeroExit {
            binary: executable.to_path_buf(),
            code: output.status.code().unwrap_or(-1),
            stderr,
        }
        .into());
    }

    if let Some(expected) = &check.expect_output
        && !stdout.contains(expected.as_str())
        && !stderr.contains(expected.as_str())
    {
        return Err(SmokeError::UnexpectedOutput {
            binary: executable.to_path_buf(),
            expected: expected.clone(),
        }
        .into());
    }

    let elapsed = started.elapsed();
    log::info!("Smoke test passed in {:.1}s", elapsed.as_secs_f64());
    Ok(SmokeReport { stdout, elapsed })
}
