//! # Version-Control Engine
//!
//! The working-repo state machine never touches git directly. It talks to
//! the [`GitOperations`] trait, which exposes the handful of primitives the
//! patch workflow needs: applying a diff, committing, hard-resetting,
//! detecting a dirty tree and extracting per-commit diffs.
//!
//! [`DefaultGitOperations`] implements the trait with the system `git`
//! command, which picks up the user's identity, hooks configuration and
//! `~/.gitconfig` like any other git invocation. Tests substitute mock
//! implementations to drive the state machine without a real repository.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use log::{debug, warn};

use crate::error::{Error, Result};

/// Outcome of applying a diff to the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The diff applied and is staged.
    Clean,
    /// The diff did not apply; the listed files need manual attention.
    Conflicted(Vec<String>),
}

/// One commit of a range, with the metadata needed to turn it into a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDiff {
    pub id: String,
    /// `Name <email>`
    pub author: String,
    pub subject: String,
    pub body: String,
    pub diff: String,
}

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Absolute path of the repository's git directory, where plypatch keeps
    /// its working state.
    fn git_dir(&self) -> Result<PathBuf>;

    /// True if tracked files have uncommitted or unstaged modifications.
    fn is_dirty(&self) -> Result<bool>;

    /// Commit id of `HEAD`.
    fn head(&self) -> Result<String>;

    /// Resolves `reference` to a commit id, failing with [`Error::InvalidRef`].
    fn resolve_ref(&self, reference: &str) -> Result<String>;

    /// Per-commit diffs of `(since, HEAD]`, oldest first, merges excluded.
    ///
    /// With a prefix, paths are made relative to it and changes outside it
    /// are dropped.
    fn diff_range(&self, since: &str, prefix: Option<&str>) -> Result<Vec<CommitDiff>>;

    /// Applies `diff` to the tree and index, under `prefix` when given.
    fn apply(&self, diff: &str, prefix: Option<&str>) -> Result<ApplyOutcome>;

    /// Paths with unmerged index entries.
    fn conflicted_files(&self) -> Result<Vec<String>>;

    /// Diff of the index against `HEAD`, relative to `prefix` when given.
    fn staged_diff(&self, prefix: Option<&str>) -> Result<String>;

    /// Commits the index and returns the new commit id.
    fn commit(&self, message: &str, author: Option<&str>) -> Result<String>;

    /// Hard reset of tree, index and `HEAD` to `reference`.
    fn revert_to(&self, reference: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command inside a working directory.
#[derive(Debug, Clone)]
pub struct DefaultGitOperations {
    workdir: PathBuf,
}

impl DefaultGitOperations {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<Output> {
        debug!("git {}", args.join(" "));
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if stdin.is_some() {
            command.stdin(Stdio::piped());
        }

        let spawn_error = |e: std::io::Error| Error::GitCommand {
            command: args.join(" "),
            stderr: e.to_string(),
        };
        let mut child = command.spawn().map_err(spawn_error)?;
        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes()).map_err(spawn_error)?;
        }
        child.wait_with_output().map_err(spawn_error)
    }

    /// Runs git and returns stdout, failing on a non-zero exit.
    fn run_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args, None)?;
        if !output.status.success() {
            return Err(Error::GitCommand {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn commit_header(&self, id: &str) -> Result<(String, String, String)> {
        let raw = self.run_ok(&["show", "-s", "--format=%an <%ae>%x00%s%x00%b", id])?;
        Ok(parse_commit_header(&raw))
    }
}

impl GitOperations for DefaultGitOperations {
    fn git_dir(&self) -> Result<PathBuf> {
        let out = self.run_ok(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(out.trim()))
    }

    fn is_dirty(&self) -> Result<bool> {
        let out = self.run_ok(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(!out.trim().is_empty())
    }

    fn head(&self) -> Result<String> {
        Ok(self.run_ok(&["rev-parse", "--verify", "HEAD"])?.trim().to_string())
    }

    fn resolve_ref(&self, reference: &str) -> Result<String> {
        let rev = format!("{}^{{commit}}", reference);
        let output = self.run(&["rev-parse", "--verify", "--quiet", &rev], None)?;
        if !output.status.success() {
            return Err(Error::InvalidRef {
                reference: reference.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn diff_range(&self, since: &str, prefix: Option<&str>) -> Result<Vec<CommitDiff>> {
        let base = self.resolve_ref(since)?;
        let range = format!("{}..HEAD", base);
        let ids = self.run_ok(&["rev-list", "--reverse", "--no-merges", &range])?;

        let relative = prefix.map(relative_arg);
        let mut commits = Vec::new();
        for id in ids.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (author, subject, body) = self.commit_header(id)?;
            let mut args = vec![
                "diff-tree",
                "-r",
                "-p",
                "--root",
                "--no-commit-id",
                "--full-index",
                "--binary",
            ];
            if let Some(relative) = &relative {
                args.push(relative);
            }
            args.push(id);
            let diff = self.run_ok(&args)?;
            commits.push(CommitDiff {
                id: id.to_string(),
                author,
                subject,
                body,
                diff,
            });
        }
        Ok(commits)
    }

    fn apply(&self, diff: &str, prefix: Option<&str>) -> Result<ApplyOutcome> {
        if diff.trim().is_empty() {
            return Ok(ApplyOutcome::Clean);
        }
        let directory = prefix.map(|p| format!("--directory={}", p.trim_matches('/')));
        let mut args = vec!["apply", "--3way"];
        if let Some(directory) = &directory {
            args.push(directory);
        }
        args.push("-");

        let output = self.run(&args, Some(diff))?;
        if output.status.success() {
            return Ok(ApplyOutcome::Clean);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("git apply reported: {}", stderr.trim());
        let mut files = self.conflicted_files()?;
        if files.is_empty() {
            // Nothing was merged into the tree; point at every file the diff touches.
            warn!("Patch could not be merged: {}", stderr.trim());
            files = files_in_diff(diff, prefix);
        }
        Ok(ApplyOutcome::Conflicted(files))
    }

    fn conflicted_files(&self) -> Result<Vec<String>> {
        let out = self.run_ok(&["diff", "--name-only", "--diff-filter=U"])?;
        let mut files: Vec<String> = out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        files.dedup();
        Ok(files)
    }

    fn staged_diff(&self, prefix: Option<&str>) -> Result<String> {
        let relative = prefix.map(relative_arg);
        let mut args = vec!["diff", "--cached", "--full-index", "--binary"];
        if let Some(relative) = &relative {
            args.push(relative);
        }
        self.run_ok(&args)
    }

    fn commit(&self, message: &str, author: Option<&str>) -> Result<String> {
        let author_arg = author.map(|a| format!("--author={}", a));
        let mut args = vec!["commit", "-q", "--no-verify", "--allow-empty", "-m", message];
        if let Some(author_arg) = &author_arg {
            args.push(author_arg);
        }
        self.run_ok(&args)?;
        self.head()
    }

    fn revert_to(&self, reference: &str) -> Result<()> {
        self.run_ok(&["reset", "-q", "--hard", reference])?;
        Ok(())
    }
}

/// `--relative=<prefix>/` argument, with exactly one trailing slash.
fn relative_arg(prefix: &str) -> String {
    format!("--relative={}/", prefix.trim_matches('/'))
}

/// Splits `%an <%ae>%x00%s%x00%b` output into author, subject and body.
fn parse_commit_header(raw: &str) -> (String, String, String) {
    let mut parts = raw.splitn(3, '\0');
    let author = parts.next().unwrap_or_default().trim().to_string();
    let subject = parts.next().unwrap_or_default().trim().to_string();
    let body = parts.next().unwrap_or_default().trim().to_string();
    (author, subject, body)
}

/// Destination paths named by `diff --git` headers, prefixed when given.
fn files_in_diff(diff: &str, prefix: Option<&str>) -> Vec<String> {
    let mut files: Vec<String> = diff
        .lines()
        .filter_map(|line| line.strip_prefix("diff --git "))
        .filter_map(|rest| rest.rsplit_once(" b/").map(|(_, path)| path))
        .map(|path| match prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_matches('/'), path),
            None => path.to_string(),
        })
        .collect();
    files.dedup();
    files
}
