//! In-memory GitOperations for unit tests.

use crate::error::{GitError, Result};
use crate::git::{CommitInfo, GitOperations, TagInfo};
use std::collections::HashMap;
use std::path::PathBuf;

/// Scripted repository state
#[derive(Debug, Default)]
pub struct FakeGit {
    /// Tags reachable per revision (`"HEAD"`, `"v1.0.0^"`, ...), nearest first
    pub tags: HashMap<String, Vec<String>>,
    /// Short hash of HEAD
    pub head: Option<String>,
    /// Commits per `since` value (`None` key stored as empty string)
    pub commits: HashMap<String, Vec<CommitInfo>>,
    /// Every query fails
    pub broken: bool,
}

impl FakeGit {
    pub fn with_tag(mut self, rev: &str, tag: &str) -> Self {
        self.tags
            .entry(rev.to_string())
            .or_default()
            .push(tag.to_string());
        self
    }

    pub fn with_head(mut self, short: &str) -> Self {
        self.head = Some(short.to_string());
        self
    }

    pub fn with_commits(mut self, since: Option<&str>, subjects: &[&str]) -> Self {
        let commits = subjects
            .iter()
            .enumerate()
            .map(|(i, &message)| {
                let (subject, body) = message.split_once("\n\n").unwrap_or((message, ""));
                CommitInfo {
                    hash: format!("{i:040}"),
                    short_hash: format!("{i:07}"),
                    subject: subject.to_string(),
                    body: body.to_string(),
                }
            })
            .collect();
        self.commits
            .insert(since.unwrap_or_default().to_string(), commits);
        self
    }

    fn check(&self) -> Result<()> {
        if self.broken {
            return Err(GitError::NotRepository {
                path: PathBuf::from("."),
            }
            .into());
        }
        Ok(())
    }
}

impl GitOperations for FakeGit {
    async fn nearest_tag(&self, rev: &str, accept: fn(&str) -> bool) -> Result<Option<TagInfo>> {
        self.check()?;
        Ok(self
            .tags
            .get(rev)
            .and_then(|names| names.iter().find(|name| accept(name.as_str())))
            .map(|name| TagInfo { name: name.clone() }))
    }

    async fn head_short_hash(&self) -> Result<Option<String>> {
        self.check()?;
        Ok(self.head.clone())
    }

    async fn commits_since(&self, since: Option<&str>) -> Result<Vec<CommitInfo>> {
        self.check()?;
        Ok(self
            .commits
            .get(since.unwrap_or_default())
            .cloned()
            .unwrap_or_default())
    }
}
