//! Version command implementation.

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::git::GitRepo;
use crate::version::VersionResolver;

use super::helpers::project_root;

/// Print the version a build would use
pub async fn execute_version(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let root = project_root(args)?;
    let git = GitRepo::open(&root).await.ok();
    let resolved = VersionResolver::new(git.as_ref()).resolve(None).await?;

    // Bare version on stdout for scripts, even with --quiet
    println!("{resolved}");
    config.verbose_println(&format!("Source: {}", resolved.source));
    config.verbose_println(&format!("Channel: {}", resolved.channel()));
    Ok(0)
}
