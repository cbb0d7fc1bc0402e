//! Version resolution for release builds.
//!
//! A build's version comes from, in order of preference: an explicit
//! override, the nearest semantic-version tag, the current commit, or the
//! `unknown` sentinel. Resolution never fails on repository state; only a
//! malformed override is rejected.

mod resolver;

pub use resolver::VersionResolver;

use crate::error::{Result, VersionError};
use serde::Serialize;
use std::fmt;

/// Sentinel used when no version information is available at all
pub const UNKNOWN_VERSION: &str = "unknown";

/// Prefix marking versions derived from a bare commit
pub const DEV_PREFIX: &str = "dev-";


/// Where a resolved version came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum VersionSource {
    /// `--version` on the command line
    Override,
    /// Nearest reachable release tag
    FromTag {
        /// Tag name as written in the repository
        tag: String,
    },
    /// No tag; current commit
    FromCommit {
        /// Abbreviated commit hash
        short_hash: String,
    },
    /// No usable repository state
    Fallback,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSource::Override => f.write_str("override"),
            VersionSource::FromTag { tag } => write!(f, "tag {tag}"),
            VersionSource::FromCommit { short_hash } => write!(f, "commit {short_hash}"),
            VersionSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// Release channel a build belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseChannel {
    /// Tagged or explicitly versioned build
    Release,
    /// Untagged commit build
    Development,
    /// Version unknown; must not be distributed
    NonReleasable,
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReleaseChannel::Release => "release",
            ReleaseChannel::Development => "development",
            ReleaseChannel::NonReleasable => "non-releasable",
        })
    }
}

/// A version string plus its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    /// Version as written into artifacts
    pub version: String,
    /// Provenance
    pub source: VersionSource,
}

impl ResolvedVersion {
    /// The `unknown` sentinel
    pub fn unknown() -> Self {
        Self {
            version: UNKNOWN_VERSION.to_string(),
            source: VersionSource::Fallback,
        }
    }

    /// Channel implied by the provenance
    pub fn channel(&self) -> ReleaseChannel {
        match self.source {
            VersionSource::Override | VersionSource::FromTag { .. } => ReleaseChannel::Release,
            VersionSource::FromCommit { .. } => ReleaseChannel::Development,
            VersionSource::Fallback => ReleaseChannel::NonReleasable,
        }
    }

    /// Whether artifacts with this version may be published
    pub fn is_releasable(&self) -> bool {
        self.channel() == ReleaseChannel::Release
    }

    /// Parsed semantic version, if the version is one
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.version).ok()
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Validate a `--version` override, stripping one leading `v`.
pub fn parse_override(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let candidate = strip_v(trimmed);
    semver::Version::parse(candidate).map_err(|source| VersionError::InvalidOverride {
        version: raw.to_string(),
        source,
    })?;
    Ok(candidate.to_string())
}

/// Semantic version named by a tag such as `v1.2.3` or `1.2.3`.
pub fn version_from_tag(tag: &str) -> Option<semver::Version> {
    semver::Version::parse(strip_v(tag.trim())).ok()
}

/// Whether `tag` names a release (`v1.2.3` or `1.2.3`).
pub fn is_release_tag(tag: &str) -> bool {
    version_from_tag(tag).is_some()
}

fn strip_v(s: &str) -> &str {
    s.strip_prefix('v')
        .or_else(|| s.strip_prefix('V'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override_strips_v() {
        assert_eq!(parse_override("v9.9.9").unwrap(), "9.9.9");
        assert_eq!(parse_override("9.9.9").unwrap(), "9.9.9");
        assert_eq!(parse_override(" 1.0.0-rc.1 ").unwrap(), "1.0.0-rc.1");
    }

    #[test]
    fn test_parse_override_rejects_garbage() {
        assert!(parse_override("").is_err());
        assert!(parse_override("latest").is_err());
        assert!(parse_override("1.2").is_err());
    }

    #[test]
    fn test_version_from_tag() {
        assert_eq!(
            version_from_tag("v1.2.3"),
            Some(semver::Version::new(1, 2, 3))
        );
        assert_eq!(version_from_tag("release-5"), None);
        assert!(is_release_tag("1.1.0"));
        assert!(!is_release_tag("v2-beta"));
    }

    #[test]
    fn test_channels() {
        assert!(ResolvedVersion::unknown().channel() == ReleaseChannel::NonReleasable);
        let dev = ResolvedVersion {
            version: "dev-abc1234".into(),
            source: VersionSource::FromCommit {
                short_hash: "abc1234".into(),
            },
        };
        assert!(!dev.is_releasable());
        assert_eq!(dev.semver(), None);
    }
}
