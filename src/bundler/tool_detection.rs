//! External tool lookup.

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Locate an external program.
///
/// A `program` containing a path separator is resolved against `root` and
/// must exist; a bare name is searched on `PATH`.
pub fn resolve_program(program: &str, root: &Path) -> Result<PathBuf> {
    let not_found = |reason: String| ConfigError::BundlerNotFound {
        program: program.to_string(),
        reason,
    };

    let as_path = Path::new(program);
    if as_path.components().count() > 1 || as_path.is_absolute() {
        let candidate = if as_path.is_absolute() {
            as_path.to_path_buf()
        } else {
            root.join(as_path)
        };
        if candidate.is_file() {
            log::debug!("Using {}", candidate.display());
            return Ok(candidate);
        }
        return Err(not_found(format!("{} does not exist", candidate.display())).into());
    }

    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {program} at: {}", path.display());
            Ok(path)
        }
        Err(e) => Err(not_found(format!("not found in PATH: {e}")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_on_path() {
        let err = resolve_program("wems-no-such-bundler", Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("wems-no-such-bundler"));
    }

    #[test]
    fn test_relative_path_resolved_against_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tools")).unwrap();
        std::fs::write(dir.path().join("tools/pyinstaller"), b"").unwrap();

        let found = resolve_program("tools/pyinstaller", dir.path()).unwrap();
        assert_eq!(found, dir.path().join("tools/pyinstaller"));
        assert!(resolve_program("tools/missing", dir.path()).is_err());
    }
}
