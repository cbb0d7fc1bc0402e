//! Context structure for executing pipeline stages with all required dependencies.

use crate::BuildRequest;
use crate::cli::RuntimeConfig;
use crate::config::ProjectConfig;
use crate::git::GitRepo;
use chrono::{DateTime, Utc};

/// Context for executing pipeline stages with all required dependencies
pub struct PipelineContext<'a> {
    /// Loaded project configuration
    pub project: &'a ProjectConfig,
    /// Parsed build request
    pub request: &'a BuildRequest,
    /// Runtime configuration for output
    pub config: &'a RuntimeConfig,
    /// Repository handle, `None` outside a git work tree
    pub git: Option<GitRepo>,
    /// Build start time, shared by every artifact
    pub built_at: DateTime<Utc>,
}
