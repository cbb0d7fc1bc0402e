//! Persisted `CHANGELOG.md` handling.
//!
//! New sections go directly below the file header, above the previous
//! release. Everything from the previous release onward is kept byte for byte.

use super::entry::ChangelogEntry;
use crate::error::{ChangelogError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Header written when the changelog does not exist yet
pub const CHANGELOG_HEADER: &str = "# Changelog\n\n\
All notable changes to this project are documented in this file.\n";

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^## \[(?P<version>[^\]]+)\]").expect("changelog section regex is valid")
});

/// What [`write_entry`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// New section prepended
    Written,
    /// A section for the version exists; file untouched
    AlreadyPresent,
    /// Existing section for the version replaced
    Replaced,
}

/// Insert `entry` into `existing` changelog text.
///
/// Returns `None` when the version is already present and `overwrite` is off.
pub fn merge(existing: &str, entry: &ChangelogEntry, overwrite: bool) -> Option<(String, WriteOutcome)> {
    let section = entry.render();

    if existing.trim().is_empty() {
        return Some((format!("{CHANGELOG_HEADER}\n{section}"), WriteOutcome::Written));
    }

    let starts: Vec<(usize, String)> = SECTION_RE
        .captures_iter(existing)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            Some((m.start(), caps["version"].to_string()))
        })
        .collect();

    if let Some(index) = starts.iter().position(|(_, v)| *v == entry.version) {
        if !overwrite {
            return None;
        }
        let start = starts[index].0;
        let merged = match starts.get(index + 1) {
            Some((end, _)) => format!("{}{section}\n{}", &existing[..start], &existing[*end..]),
            None => format!("{}{section}", &existing[..start]),
        };
        return Some((merged, WriteOutcome::Replaced));
    }

    let merged = match starts.first() {
        Some((pos, _)) => format!("{}{section}\n{}", &existing[..*pos], &existing[*pos..]),
        None => format!("{}\n\n{section}", existing.trim_end()),
    };
    Some((merged, WriteOutcome::Written))
}

/// Apply `entry` to the changelog at `path`, creating it if needed.
pub async fn write_entry(path: &Path, entry: &ChangelogEntry, overwrite: bool) -> Result<WriteOutcome> {
    let existing = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(ChangelogError::Io {
                operation: "read",
                path: path.to_path_buf(),
                source,
            }
            .into());
        }
    };

    let Some((merged, outcome)) = merge(&existing, entry, overwrite) else {
        log::info!(
            "{} already has a section for {}; leaving it unchanged",
            path.display(),
            entry.version
        );
        return Ok(WriteOutcome::AlreadyPresent);
    };

    let tmp = path.with_extension("md.tmp");
    let io_err = |operation: &'static str| {
        move |source: std::io::Error| ChangelogError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(io_err("create directory for"))?;
    }
    tokio::fs::write(&tmp, merged).await.map_err(io_err("write"))?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err("replace"))?;

    log::info!("Updated {} ({outcome:?})", path.display());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::CommitInfo;
    use chrono::NaiveDate;

    fn versions(text: &str) -> Vec<String> {
        SECTION_RE
            .captures_iter(text)
            .map(|caps| caps["version"].to_string())
            .collect()
    }

    fn entry(version: &str, subjects: &[&str]) -> ChangelogEntry {
        let commits: Vec<_> = subjects
            .iter()
            .map(|s| CommitInfo {
                hash: String::new(),
                short_hash: String::new(),
                subject: s.to_string(),
                body: String::new(),
            })
            .collect();
        ChangelogEntry::from_commits(
            version,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            &commits,
        )
    }

    const EXISTING: &str = "# Changelog\n\nNotes.\n\n## [1.0.0] - 2026-01-01\n\n### Added\n\n- first\n\n## [0.9.0] - 2025-12-01\n\n- old\n";

    #[test]
    fn test_new_file_gets_header() {
        let (text, outcome) = merge("", &entry("1.0.0", &["feat: first"]), false).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
        assert!(text.starts_with(CHANGELOG_HEADER));
        assert!(text.contains("## [1.0.0] - 2026-10-19\n\n### Added\n\n- first\n"));
    }

    #[test]
    fn test_prepend_preserves_prior_entries() {
        let (text, _) = merge(EXISTING, &entry("1.1.0", &["fix: bug"]), false).unwrap();
        let new_pos = text.find("## [1.1.0]").unwrap();
        let old_pos = text.find("## [1.0.0]").unwrap();
        assert!(new_pos < old_pos);
        assert!(text.starts_with("# Changelog\n\nNotes.\n\n## [1.1.0]"));
        assert!(text.ends_with(&EXISTING[EXISTING.find("## [1.0.0]").unwrap()..]));
        assert_eq!(versions(&text), vec!["1.1.0", "1.0.0", "0.9.0"]);
    }

    #[test]
    fn test_duplicate_version_is_noop() {
        assert!(merge(EXISTING, &entry("1.0.0", &["feat: again"]), false).is_none());
    }

    #[test]
    fn test_overwrite_replaces_only_that_section() {
        let (text, outcome) = merge(EXISTING, &entry("1.0.0", &["fix: replaced"]), true).unwrap();
        assert_eq!(outcome, WriteOutcome::Replaced);
        assert!(text.contains("- replaced"));
        assert!(!text.contains("- first"));
        assert!(text.ends_with("## [0.9.0] - 2025-12-01\n\n- old\n"));
        assert_eq!(versions(&text), vec!["1.0.0", "0.9.0"]);
    }

    #[test]
    fn test_header_only_file() {
        let (text, _) = merge("# Changelog\n\n", &entry("0.1.0", &[]), false).unwrap();
        assert_eq!(
            text,
            "# Changelog\n\n## [0.1.0] - 2026-10-19\n\nNo notable changes.\n"
        );
    }

    #[tokio::test]
    async fn test_write_entry_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let entry = entry("1.2.3", &["feat: add bulk import"]);

        assert_eq!(write_entry(&path, &entry, false).await.unwrap(), WriteOutcome::Written);
        let first = std::fs::read_to_string(&path).unwrap();

        assert_eq!(
            write_entry(&path, &entry, false).await.unwrap(),
            WriteOutcome::AlreadyPresent
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
        assert_eq!(first.matches("## [1.2.3]").count(), 1);
    }
}
