//! Changelog and release-notes generation from conventional commits.
//!
//! The commit range runs from the previous release tag to `HEAD`. When `HEAD`
//! is already tagged with the version being released, that tag is skipped so
//! the range still covers the release's own commits.

mod conventional;
mod entry;
mod file;

pub use conventional::{Category, CommitParser, ConventionalCommit};
pub use entry::{ChangelogEntry, NO_CHANGES};
pub use file::{CHANGELOG_HEADER, WriteOutcome, merge, write_entry};

use crate::error::{ChangelogError, Result};
use crate::git::GitOperations;
use crate::version::{ResolvedVersion, is_release_tag, version_from_tag};
use chrono::NaiveDate;

/// Builds changelog entries from repository history
#[derive(Debug)]
pub struct ChangelogGenerator<'a, G> {
    git: &'a G,
}

impl<'a, G: GitOperations> ChangelogGenerator<'a, G> {
    /// Create a generator over `git`
    pub fn new(git: &'a G) -> Self {
        Self { git }
    }

    /// Tag the range starts from, excluding a tag that names `version`.
    pub async fn previous_tag(&self, version: &str) -> Result<Option<String>> {
        let releasing = semver::Version::parse(version).ok();

        let Some(tag) = self.git.nearest_tag("HEAD", is_release_tag).await? else {
            return Ok(None);
        };

        if releasing.is_some() && version_from_tag(&tag.name) == releasing {
            log::debug!("{} names the version being released; looking further back", tag.name);
            let parent = format!("{}^", tag.name);
            return Ok(self
                .git
                .nearest_tag(&parent, is_release_tag)
                .await?
                .map(|t| t.name));
        }

        Ok(Some(tag.name))
    }

    /// Collect and classify the commits for `version`.
    ///
    /// `since` overrides the start of the range.
    pub async fn generate(
        &self,
        version: &ResolvedVersion,
        since: Option<&str>,
        date: NaiveDate,
    ) -> Result<ChangelogEntry> {
        if !version.is_releasable() {
            return Err(ChangelogError::NonReleasableVersion {
                version: version.version.clone(),
            }
            .into());
        }

        let start = match since {
            Some(rev) => Some(rev.to_string()),
            None => self.previous_tag(&version.version).await?,
        };
        match &start {
            Some(rev) => log::info!("Collecting commits since {rev}"),
            None => log::info!("No previous release tag; collecting full history"),
        }

        let commits = self.git.commits_since(start.as_deref()).await?;
        let entry = ChangelogEntry::from_commits(&version.version, date, &commits);
        log::debug!("{} commits in changelog for {}", entry.len(), version.version);
        Ok(entry)
    }
}
