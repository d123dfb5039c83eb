//! Shared test utilities for integration and E2E tests.
//!
//! Every fixture is a temporary directory holding a git working tree
//! (`work/`, with one initial commit) and room for a patch-repo
//! (`patches/`). Tests need the `git` binary, so they are gated behind the
//! `integration-tests` feature.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! #[cfg_attr(not(feature = "integration-tests"), ignore)]
//! fn test_example() {
//!     let fixture = GitFixture::new();
//!     fixture.ply().arg("init").arg(fixture.patches()).assert().success();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    pub use super::GitFixture;
}

/// A temporary git working tree plus a sibling patch-repo location.
pub struct GitFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl GitFixture {
    /// A working tree with `README` committed as `Initial commit`.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        std::fs::create_dir_all(fixture.work()).expect("Failed to create work dir");
        fixture.git(&["init", "-q"]);
        fixture.git(&["config", "user.name", "Ply Tester"]);
        fixture.git(&["config", "user.email", "tester@example.com"]);
        fixture.git(&["config", "commit.gpgsign", "false"]);
        fixture.commit_file("README", "line one\n", "Initial commit");
        fixture
    }

    /// The git working tree.
    pub fn work(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    /// Where tests put the patch-repo.
    pub fn patches(&self) -> PathBuf {
        self.temp_dir.path().join("patches")
    }

    /// Runs git in the working tree and returns trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.work())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Writes a file in the working tree without staging it.
    pub fn write(&self, path: &str, content: &str) {
        self.temp_dir
            .child("work")
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
    }

    /// Reads a file from the working tree.
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.work().join(path)).expect("Failed to read file")
    }

    /// Writes, stages and commits one file; returns the new commit id.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> String {
        self.write(path, content);
        self.git(&["add", path]);
        self.git(&["commit", "-q", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Subject of `HEAD`.
    pub fn head_subject(&self) -> String {
        self.git(&["log", "-1", "--format=%s"])
    }

    pub fn is_clean(&self) -> bool {
        self.git(&["status", "--porcelain", "--untracked-files=no"]).is_empty()
    }

    /// Series manifest lines of the patch-repo.
    pub fn series(&self) -> Vec<String> {
        std::fs::read_to_string(self.patches().join("series"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A `ply` command running inside the working tree, without colour.
    pub fn ply(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ply");
        cmd.current_dir(self.work())
            .env("NO_COLOR", "1")
            .env_remove("PLY_LOG")
            .env_remove("PLY_WORKING_REPO");
        cmd
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}
