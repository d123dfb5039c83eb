//! # Working State
//!
//! Everything plypatch remembers about a working-repo between invocations:
//! the linked patch-repo, how many series patches are applied, the commit
//! they were applied on top of, and the conflict marker of a stopped
//! restore.
//!
//! The state lives in the repository's git directory (`<git-dir>/ply/state.json`)
//! so it travels with the clone and never shows up as a tracked change. Each
//! save replaces the file atomically. Only one process may drive a working
//! tree at a time; concurrent invocations are not coordinated.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::{STATE_DIR, STATE_FILE};
use crate::error::Result;
use crate::filesystem::write_atomic;

/// Marker left behind when a restore stops on a patch that did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// The patch that failed to apply.
    pub patch: String,
    /// Files reported as conflicted when it failed.
    #[serde(default)]
    pub files: Vec<String>,
    /// `HEAD` before the restore began; `abort` resets here.
    pub restore_start: String,
    /// Applied count before the restore began; `abort` restores it.
    pub applied_before: usize,
}

/// Persisted working-repo state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingState {
    /// Absolute path of the linked patch-repo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_repo: Option<PathBuf>,
    /// Number of leading series patches applied to the tree.
    #[serde(default)]
    pub applied: usize,
    /// Commit the first applied patch sits on; `rollback` resets here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Present while a restore is stopped on a conflict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<Conflict>,
}

impl WorkingState {
    /// Location of the state file for a git directory.
    pub fn path_in(git_dir: &Path) -> PathBuf {
        git_dir.join(STATE_DIR).join(STATE_FILE)
    }

    /// Loads the state, or the default (unlinked) state if none was saved.
    pub fn load(git_dir: &Path) -> Result<Self> {
        match fs::read_to_string(Self::path_in(git_dir)) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persists the state atomically.
    pub fn save(&self, git_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(&Self::path_in(git_dir), &json)
    }

    pub fn is_linked(&self) -> bool {
        self.patch_repo.is_some()
    }
}
