//! Command execution functions.
//!
//! Each subcommand lives in its own module and returns the process exit code.
//! Errors are reported here once, with recovery suggestions, so the command
//! bodies can propagate with `?`.

mod build;
mod changelog;
mod helpers;
mod init;
mod verify;
mod version;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

pub use build::build_request;

use build::execute_build;
use changelog::execute_changelog;
use init::execute_init;
use verify::execute_verify;
use version::execute_version;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Validation errors are never quiet
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {validation_error}"));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Build { .. } => execute_build(&args, &config).await,
        Command::Changelog { .. } => execute_changelog(&args, &config).await,
        Command::Verify => execute_verify(&args, &config).await,
        Command::Version => execute_version(&args, &config).await,
        Command::Init { .. } => execute_init(&args, &config).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            log::debug!("{} failed: {e:?}", args.command.name());
            config.error_println(&format!("Command '{}' failed: {}", args.command.name(), e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {suggestion}"));
                }
            }

            Ok(1)
        }
    }
}
