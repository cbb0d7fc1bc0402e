//! Version resolver over a git backend.

use super::{
    DEV_PREFIX, ResolvedVersion, VersionSource, is_release_tag, parse_override, version_from_tag,
};
use crate::error::Result;
use crate::git::GitOperations;

/// Resolves the version of a build.
///
/// `git` is `None` when the project is not a repository (or git is missing);
/// the resolver then falls straight through to the `unknown` sentinel.
#[derive(Debug)]
pub struct VersionResolver<'a, G> {
    git: Option<&'a G>,
}

impl<'a, G: GitOperations> VersionResolver<'a, G> {
    /// Create a resolver
    pub fn new(git: Option<&'a G>) -> Self {
        Self { git }
    }

    /// Resolve the build version.
    ///
    /// Returns an error only for an invalid `override_version`.
    pub async fn resolve(&self, override_version: Option<&str>) -> Result<ResolvedVersion> {
        if let Some(raw) = override_version {
            let version = parse_override(raw)?;
            log::info!("Using version override {version}");
            return Ok(ResolvedVersion {
                version,
                source: VersionSource::Override,
            });
        }

        let Some(git) = self.git else {
            log::warn!("No git repository; version is unknown");
            return Ok(ResolvedVersion::unknown());
        };

        match git.nearest_tag("HEAD", is_release_tag).await {
            Ok(Some(tag)) => {
                if let Some(version) = version_from_tag(&tag.name) {
                    log::info!("Version {version} from tag {}", tag.name);
                    return Ok(ResolvedVersion {
                        version: version.to_string(),
                        source: VersionSource::FromTag { tag: tag.name },
                    });
                }
            }
            Ok(None) => log::debug!("No release tag reachable from HEAD"),
            Err(e) => log::warn!("Could not query tags: {e}"),
        }

        match git.head_short_hash().await {
            Ok(Some(short_hash)) => {
                log::info!("No release tag; development build from commit {short_hash}");
                Ok(ResolvedVersion {
                    version: format!("{DEV_PREFIX}{short_hash}"),
                    source: VersionSource::FromCommit { short_hash },
                })
            }
            Ok(None) => {
                log::warn!("Repository has no commits; version is unknown");
                Ok(ResolvedVersion::unknown())
            }
            Err(e) => {
                log::warn!("Could not read HEAD ({e}); version is unknown");
                Ok(ResolvedVersion::unknown())
            }
        }
    }
}
