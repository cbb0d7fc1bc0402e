//! Git query trait and types used by the version resolver and changelog.
//!
//! The pipeline only ever reads repository state. The production
//! implementation lives in the git_adapter module; tests substitute fakes.

use crate::error::Result;
use std::future::Future;

/// Read-only Git queries needed by a release build
pub trait GitOperations {
    /// Nearest tag reachable from `rev` whose name satisfies `accept`.
    ///
    /// Tags that `accept` rejects are passed over, so an older accepted tag
    /// behind them still wins. `Ok(None)` means no tag was accepted or `rev`
    /// does not resolve.
    fn nearest_tag(
        &self,
        rev: &str,
        accept: fn(&str) -> bool,
    ) -> impl Future<Output = Result<Option<TagInfo>>>;

    /// Abbreviated hash of `HEAD`, or `None` if the repository has no commits.
    fn head_short_hash(&self) -> impl Future<Output = Result<Option<String>>>;

    /// Commits reachable from `HEAD` but not from `since`, newest first.
    ///
    /// With `since = None` the whole history of `HEAD` is returned.
    fn commits_since(&self, since: Option<&str>) -> impl Future<Output = Result<Vec<CommitInfo>>>;
}

/// Information about a Git commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit hash (full SHA)
    pub hash: String,
    /// Short commit hash
    pub short_hash: String,
    /// First line of the message
    pub subject: String,
    /// Remaining message lines
    pub body: String,
}

/// Information about a Git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
}
