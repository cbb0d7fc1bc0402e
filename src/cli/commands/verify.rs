//! Verify command implementation.

use crate::artifact::{VerifyStatus, verify_dist};
use crate::cli::{Args, RuntimeConfig};
use crate::config::BuildTarget;
use crate::error::Result;

use super::helpers::load_project;

/// Execute the verify command
pub async fn execute_verify(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let project = load_project(args).await?;
    let dist = project.dist_dir();

    let binaries: Vec<String> = [BuildTarget::Gui, BuildTarget::Cli]
        .into_iter()
        .filter_map(|t| project.config().target(t).ok())
        .map(|spec| spec.binary.clone())
        .collect();

    config.section("Verify");
    let report = verify_dist(&dist, &binaries).await?;

    for binary in &report.not_built {
        config.verbose_println(&format!("{binary}: not built"));
    }
    for (path, status) in &report.entries {
        match status {
            VerifyStatus::Verified { checksum } => {
                config.success_println(&format!("{} {}", path.display(), checksum))
            }
            VerifyStatus::MissingSidecar => {
                config.error_println(&format!("{}: no checksum sidecar", path.display()))
            }
            VerifyStatus::Mismatch { expected, actual } => config.error_println(&format!(
                "{}: checksum mismatch (sidecar {expected}, file {actual})",
                path.display()
            )),
            VerifyStatus::Unreadable { reason } => {
                config.error_println(&format!("{}: {reason}", path.display()))
            }
        }
    }

    if report.entries.is_empty() {
        config.error_println(&format!("Nothing to verify in {}", dist.display()));
        return Ok(1);
    }
    if !report.is_success() {
        config.error_println(&format!("{} check(s) failed", report.failures()));
        return Ok(1);
    }

    config.success_println(&format!("{} file(s) verified", report.entries.len()));
    Ok(0)
}
