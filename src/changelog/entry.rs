//! One release section of the changelog.

use super::conventional::{Category, CommitParser};
use crate::git::CommitInfo;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Text written for a release with no commits in range
pub const NO_CHANGES: &str = "No notable changes.";

/// Changelog section for one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// Version the section is headed with
    pub version: String,
    /// Release date
    pub date: NaiveDate,
    /// Rendered list items per bucket, newest commit first
    pub sections: BTreeMap<Category, Vec<String>>,
}

impl ChangelogEntry {
    /// Classify `commits` into a new entry.
    pub fn from_commits(version: &str, date: NaiveDate, commits: &[CommitInfo]) -> Self {
        let parser = CommitParser;
        let mut sections: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        for commit in commits {
            let parsed = parser.parse(commit);
            sections.entry(parsed.category).or_default().push(parsed.line());
        }
        Self {
            version: version.to_string(),
            date,
            sections,
        }
    }

    /// Number of listed commits
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// True when no commits were in range
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `## [<version>] - <date>`
    pub fn heading(&self) -> String {
        format!("## [{}] - {}", self.version, self.date.format("%Y-%m-%d"))
    }

    /// Category sections without the version heading, for release notes.
    pub fn render_notes(&self) -> String {
        if self.is_empty() {
            return format!("{NO_CHANGES}\n");
        }

        let mut out = String::new();
        // BTreeMap iterates in Category declaration order
        for (category, lines) in &self.sections {
            if lines.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("### {}\n\n", category.heading()));
            for line in lines {
                out.push_str(&format!("- {line}\n"));
            }
        }
        out
    }

    /// Full section: heading followed by the notes.
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.heading(), self.render_notes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits(subjects: &[&str]) -> Vec<CommitInfo> {
        subjects
            .iter()
            .enumerate()
            .map(|(i, subject)| CommitInfo {
                hash: format!("{i:040}"),
                short_hash: format!("{i:07}"),
                subject: subject.to_string(),
                body: String::new(),
            })
            .collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_render_orders_buckets() {
        let entry = ChangelogEntry::from_commits(
            "1.2.3",
            date(),
            &commits(&[
                "Update README",
                "fix: crash on empty sheet",
                "feat: add bulk import",
                "security: escape CSV formulas",
            ]),
        );

        assert_eq!(
            entry.render(),
            "## [1.2.3] - 2026-10-19\n\
             \n\
             ### Security\n\
             \n\
             - escape CSV formulas (0000003)\n\
             \n\
             ### Added\n\
             \n\
             - add bulk import (0000002)\n\
             \n\
             ### Fixed\n\
             \n\
             - crash on empty sheet (0000001)\n\
             \n\
             ### Other\n\
             \n\
             - Update README (0000000)\n"
        );
    }

    #[test]
    fn test_empty_range() {
        let entry = ChangelogEntry::from_commits("1.2.4", date(), &[]);
        assert!(entry.is_empty());
        assert_eq!(entry.render_notes(), "No notable changes.\n");
        assert!(entry.render().starts_with("## [1.2.4] - 2026-10-19\n\n"));
    }

    #[test]
    fn test_commit_order_kept_within_bucket() {
        let entry = ChangelogEntry::from_commits(
            "2.0.0",
            date(),
            &commits(&["feat: newest", "feat: oldest"]),
        );
        assert_eq!(
            entry.sections[&Category::Added],
            vec!["newest (0000000)", "oldest (0000001)"]
        );
        assert_eq!(entry.len(), 2);
    }
}
