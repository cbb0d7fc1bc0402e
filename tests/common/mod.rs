//! Fixture project with a stand-in bundler.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wems_release::ProjectConfig;

/// Stand-in for PyInstaller: creates `<distpath>/<name>/<name>` as a small
/// shell executable and logs its argv to `bundler.log`. If `smoke-fail`
/// exists in the project, the produced executable exits with status 3.
pub const FAKE_BUNDLER: &str = r#"#!/bin/sh
echo "$@" >> bundler.log
dist=""
name=""
while [ $# -gt 0 ]; do
  case "$1" in
    --distpath) dist="$2"; shift 2 ;;
    --name) name="$2"; shift 2 ;;
    *) shift ;;
  esac
done
[ -n "$dist" ] && [ -n "$name" ] || exit 64
mkdir -p "$dist/$name"
if [ -f smoke-fail ]; then
  printf '#!/bin/sh\necho "boom" >&2\nexit 3\n' > "$dist/$name/$name"
else
  printf '#!/bin/sh\necho "%s 1.0"\n' "$name" > "$dist/$name/$name"
fi
chmod +x "$dist/$name/$name"
"#;

pub const FAKE_PYTHON: &str = "#!/bin/sh\necho \"Python 3.12.4\"\n";

pub const CONFIG: &str = r#"
[project]
name = "Wareflow EMS"

[bundler]
program = "tools/pyinstaller"

[tests]
command = ["sh", "run-tests.sh"]
paths = []
ignore = []

[targets.gui]
binary = "wems"
entry_point = "src/main.py"
mode = "windowed"
hidden_imports = ["flet", "src.database"]
excludes = ["tkinter"]

[[targets.gui.data]]
source = "src/assets"
dest = "assets"

[targets.cli]
binary = "wems-cli"
entry_point = "src/cli.py"
mode = "console"
hidden_imports = ["src.database"]

[targets.cli.smoke]
args = ["--version"]
timeout_secs = 10
expect_output = "wems-cli"
"#;

/// A throwaway Wareflow EMS checkout.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Project with passing tests and a working bundler.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write(root, "wems-build.toml", CONFIG);
        write(root, "src/main.py", "print('gui')\n");
        write(root, "src/cli.py", "print('cli')\n");
        write(root, "src/assets/logo.txt", "logo\n");
        write(root, "run-tests.sh", "exit 0\n");
        write(root, "tools/pyinstaller", FAKE_BUNDLER);
        make_executable(&root.join("tools/pyinstaller"));
        write(root, "tools/python", FAKE_PYTHON);
        make_executable(&root.join("tools/python"));

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Loaded configuration using the fake interpreter.
    pub async fn project(&self) -> ProjectConfig {
        ProjectConfig::load(self.root(), None)
            .await
            .unwrap()
            .with_overrides(None, Some(self.python()))
    }

    /// Absolute path of the fake interpreter
    pub fn python(&self) -> String {
        self.path("tools/python").display().to_string()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        write(self.root(), rel, contents);
    }

    pub fn remove(&self, rel: &str) {
        std::fs::remove_file(self.path(rel)).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap()
    }

    pub fn bundler_log(&self) -> String {
        std::fs::read_to_string(self.path("bundler.log")).unwrap_or_default()
    }
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

/// Whether `git` is on PATH
pub fn has_git() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// Run git in `dir`, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

/// Commit everything with `message`.
pub fn commit(dir: &Path, message: &str) {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "--no-gpg-sign", "--allow-empty", "-m", message]);
}
