//! # Error Handling
//!
//! This module defines the centralized error type for `plypatch`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! the patch-repo and working-repo operations can report.
//!
//! ## Key Components
//!
//! - **`Error`**: One variant per failure kind. Variants that the CLI needs to
//!   render in detail carry a structured payload (for example the list of
//!   conflicted files) instead of a preformatted string.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Precondition failures (`NotLinked`, `UncommittedChanges`,
//! `NoPatchesApplied`, ...) are always raised before any state is touched.
//! `PatchDidNotApplyCleanly` is the one error that leaves the working tree in
//! a recoverable conflict state, which `resolve`, `skip` and `abort` act on.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for plypatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// The working-repo is already linked to a patch-repo.
    #[error("Already linked to a patch-repo: {}", path.display())]
    AlreadyLinked { path: PathBuf },

    /// The working-repo is not linked to any patch-repo.
    #[error("Not linked to a patch-repo")]
    NotLinked,

    /// The working tree has uncommitted changes to tracked files.
    #[error("Uncommitted changes, commit or discard before continuing")]
    UncommittedChanges,

    /// Rollback was requested but no patches are applied.
    #[error("Cannot rollback, no patches applied")]
    NoPatchesApplied,

    /// A patch named in the series (or on the command line) does not exist.
    #[error("Patch not found: {name}")]
    PatchNotFound { name: String },

    /// A patch failed to apply and the tree was left with conflicts.
    #[error("Patch {patch} did not apply cleanly ({} conflicted file(s): {})", files.len(), files.join(", "))]
    PatchDidNotApplyCleanly { patch: String, files: Vec<String> },

    /// The series manifest and the patch files disagree.
    #[error("Inconsistent patch-repo: {} missing file(s), {} orphan file(s)", missing_file.len(), orphan_file.len())]
    InconsistentRepo {
        missing_file: Vec<String>,
        orphan_file: Vec<String>,
    },

    /// `init` was run on a directory that already holds a patch-repo.
    #[error("Patch-repo already initialized at {}", path.display())]
    RepoAlreadyInitialized { path: PathBuf },

    /// The given path does not hold an initialized patch-repo.
    #[error("Not a patch-repo: {} (run `ply init` first)", path.display())]
    NotAPatchRepo { path: PathBuf },

    /// A mutating operation was attempted while a restore is stopped on a
    /// conflict.
    #[error("Restore in progress (stopped at {patch}), use resolve, skip or abort to continue")]
    RestoreInProgress { patch: String },

    /// `resolve`, `skip` or `abort` was called without a stopped restore.
    #[error("No restore in progress")]
    NoRestoreInProgress,

    /// `resolve` was called while unmerged paths remain.
    #[error("Unresolved conflicts remain in: {}", files.join(", "))]
    UnresolvedConflicts { files: Vec<String> },

    /// `resolve` found nothing staged for the conflicting patch.
    #[error("Nothing staged for {patch}; stage the resolved files, or use `ply skip` to drop the patch")]
    EmptyResolution { patch: String },

    /// `save` was called while only part of the series is applied.
    #[error("Only {applied} of {total} patches are applied; restore the series before saving")]
    SeriesNotApplied { applied: usize, total: usize },

    /// `unlink` was refused because patches are still applied.
    #[error("{count} patch(es) still applied; rollback first or unlink with --force")]
    PatchesApplied { count: usize },

    /// A patch with this name is already part of the patch-repo.
    #[error("Patch already exists: {name}")]
    PatchAlreadyExists { name: String },

    /// The name cannot be used as a patch file name.
    #[error("Invalid patch name: {name:?}")]
    InvalidPatchName { name: String },

    /// A git reference could not be resolved to a commit.
    #[error("Invalid reference: {reference}")]
    InvalidRef { reference: String },

    /// A patch file could not be parsed.
    #[error("Malformed patch {name}: {message}")]
    MalformedPatch { name: String, message: String },

    /// A git command exited unsuccessfully.
    #[error("Git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A state file (de)serialization error, wrapped from `serde_json::Error`.
    #[error("State file error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
