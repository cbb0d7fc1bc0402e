//! Init command implementation.

use crate::bundler::utils::fs;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{CONFIG_TEMPLATE, DEFAULT_CONFIG_FILE};
use crate::error::{CliError, Result};

use super::helpers::project_root;

/// Write the starter configuration
pub async fn execute_init(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let force = matches!(args.command, Command::Init { force: true });
    let root = project_root(args)?;
    let path = match &args.config {
        Some(p) if p.is_absolute() => p.clone(),
        Some(p) => root.join(p),
        None => root.join(DEFAULT_CONFIG_FILE),
    };

    if path.exists() && !force {
        return Err(CliError::ExecutionFailed {
            command: "init".to_string(),
            reason: format!("{} already exists (use --force to replace it)", path.display()),
        }
        .into());
    }

    fs::write_file(&path, CONFIG_TEMPLATE).await?;
    config.success_println(&format!("Wrote {}", path.display()));
    config.indent("Adjust entry points, hidden imports and data files, then run: wems_release build");
    Ok(0)
}
