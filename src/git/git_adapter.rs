//! GitOperations backed by gix.
//!
//! Every query runs on the blocking pool against a thread-local handle of the
//! shared repository.

use crate::error::{GitError, Result};
use crate::git::{CommitInfo, GitOperations, TagInfo};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Git operations using the pure Rust gix backend
#[derive(Clone)]
pub struct GitRepo {
    repo: gix::ThreadSafeRepository,
    work_dir: PathBuf,
}

impl fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepo")
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the repository containing `path`.
    ///
    /// Fails with [`GitError::NotRepository`] when no repository with a work
    /// tree is found at or above `path`.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let search_from = path.clone();

        let discovered = tokio::task::spawn_blocking(move || {
            gix::discover(&search_from)
                .map(|repo| (repo.workdir().map(Path::to_path_buf), repo.into_sync()))
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(query_error("opening repository"))?;

        match discovered {
            Ok((Some(work_dir), repo)) => {
                log::debug!("Opened git repository at {}", work_dir.display());
                Ok(Self { repo, work_dir })
            }
            Ok((None, _)) => {
                log::debug!("Repository for {} has no work tree", path.display());
                Err(GitError::NotRepository { path }.into())
            }
            Err(reason) => {
                log::debug!("No repository at {}: {reason}", path.display());
                Err(GitError::NotRepository { path }.into())
            }
        }
    }

    async fn with_repo<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&gix::Repository) -> std::result::Result<T, GitError> + Send + 'static,
    {
        let repo = self.repo.clone();
        let value = tokio::task::spawn_blocking(move || f(&repo.to_thread_local()))
            .await
            .map_err(query_error(operation))??;
        Ok(value)
    }
}

impl GitOperations for GitRepo {
    async fn nearest_tag(&self, rev: &str, accept: fn(&str) -> bool) -> Result<Option<TagInfo>> {
        let rev = rev.to_string();
        self.with_repo("finding nearest tag", move |repo| {
            let Some(start) = resolve_commit(repo, &rev) else {
                return Ok(None);
            };

            let mut tags = tags_by_commit(repo)?;
            tags.retain(|_, names| {
                names.retain(|name| accept(name.as_str()));
                !names.is_empty()
            });
            if tags.is_empty() {
                return Ok(None);
            }

            // Breadth-first: the first tagged commit is the one with the fewest
            // commits between it and `rev`.
            for id in ancestors(repo, start)? {
                if let Some(names) = tags.get_mut(&id) {
                    names.sort();
                    return Ok(names.pop().map(|name| TagInfo { name }));
                }
            }
            Ok(None)
        })
        .await
    }

    async fn head_short_hash(&self) -> Result<Option<String>> {
        self.with_repo("reading HEAD", |repo| {
            let head = repo.head().map_err(query_error("reading HEAD"))?;
            Ok(head.id().map(|id| {
                id.shorten()
                    .map(|prefix| prefix.to_string())
                    .unwrap_or_else(|_| id.to_string())
            }))
        })
        .await
    }

    async fn commits_since(&self, since: Option<&str>) -> Result<Vec<CommitInfo>> {
        let since = since.map(str::to_string);
        self.with_repo("reading history", move |repo| {
            let head = repo.head().map_err(query_error("reading HEAD"))?;
            let Some(head_id) = head.id().map(|id| id.detach()) else {
                return Ok(Vec::new());
            };

            let hidden: HashSet<gix::ObjectId> = match since.as_deref() {
                Some(rev) => {
                    let start = resolve_commit(repo, rev).ok_or_else(|| GitError::Query {
                        operation: "resolving revision",
                        reason: format!("'{rev}' does not name a commit"),
                    })?;
                    ancestors(repo, start)?.into_iter().collect()
                }
                None => HashSet::new(),
            };

            ancestors(repo, head_id)?
                .into_iter()
                .filter(|id| !hidden.contains(id))
                .map(|id| {
                    let commit = repo.find_commit(id).map_err(query_error("reading commit"))?;
                    commit_info(&commit)
                })
                .collect()
        })
        .await
    }
}

fn query_error<E: fmt::Display>(operation: &'static str) -> impl Fn(E) -> GitError {
    move |e| GitError::Query {
        operation,
        reason: e.to_string(),
    }
}

/// Commit named by `rev`, peeling tags. `None` when `rev` does not resolve.
fn resolve_commit(repo: &gix::Repository, rev: &str) -> Option<gix::ObjectId> {
    let id = match repo.rev_parse_single(rev) {
        Ok(id) => id,
        Err(e) => {
            log::debug!("{rev} does not resolve: {e}");
            return None;
        }
    };
    let commit = id.object().ok()?.peel_to_commit().ok()?;
    Some(commit.id)
}

/// Commits reachable from `start`, breadth-first, `start` included.
fn ancestors(
    repo: &gix::Repository,
    start: gix::ObjectId,
) -> std::result::Result<Vec<gix::ObjectId>, GitError> {
    repo.rev_walk([start])
        .all()
        .map_err(query_error("walking history"))?
        .map(|info| info.map(|info| info.id).map_err(query_error("walking history")))
        .collect()
}

/// Tag names keyed by the commit they point at.
fn tags_by_commit(
    repo: &gix::Repository,
) -> std::result::Result<HashMap<gix::ObjectId, Vec<String>>, GitError> {
    let mut map: HashMap<gix::ObjectId, Vec<String>> = HashMap::new();
    let references = repo.references().map_err(query_error("listing references"))?;

    for reference in references.tags().map_err(query_error("listing tags"))? {
        let mut reference = reference.map_err(query_error("reading tag"))?;
        let name = reference.name().shorten().to_string();
        match reference.peel_to_id_in_place() {
            Ok(id) => map.entry(id.detach()).or_default().push(name),
            Err(e) => log::debug!("Skipping tag {name}: {e}"),
        }
    }
    Ok(map)
}

fn commit_info(commit: &gix::Commit<'_>) -> std::result::Result<CommitInfo, GitError> {
    let hash = commit.id.to_string();
    let short_hash = commit
        .id()
        .shorten()
        .map(|prefix| prefix.to_string())
        .unwrap_or_else(|_| hash.clone());
    let message = commit
        .message()
        .map_err(query_error("decoding commit message"))?;

    Ok(CommitInfo {
        hash,
        short_hash,
        subject: message.summary().to_string().trim().to_string(),
        body: message
            .body
            .map(|body| body.to_string().trim().to_string())
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_non_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            GitRepo::open(dir.path()).await,
            Err(crate::error::ReleaseError::Git(GitError::NotRepository { .. }))
        ));
    }
}
