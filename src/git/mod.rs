//! Git queries for release builds.
//!
//! This module exposes the read-only repository queries the version resolver
//! and changelog generator depend on, and a backend built on gix.

mod git_adapter;
mod operations;

pub use git_adapter::GitRepo;
pub use operations::{CommitInfo, GitOperations, TagInfo};

#[cfg(test)]
pub(crate) mod fake;
