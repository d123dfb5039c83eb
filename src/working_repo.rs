//! # Working Repository
//!
//! A `WorkingRepo` wraps a live git tree that is linked to exactly one
//! patch-repo and owns the apply/rollback state machine:
//!
//! ```text
//!            link                   restore (conflict)
//! UNLINKED ───────▶ CLEAN ───────────────────────────▶ CONFLICT
//!          ◀─────── │  ▲  ◀── resolve / skip (series done) ──┘ │
//!            unlink │  └──────────── abort ◀──────────────────┘
//!                   └─ save / restore / rollback
//! ```
//!
//! `CLEAN` is reported as `no-patches-applied` or `all-patches-applied`
//! depending on the applied count. Every operation re-reads the persisted
//! [`WorkingState`] on entry, validates its preconditions before mutating
//! anything, and persists the state after every committed patch so an
//! interrupted restore can be resumed.

use std::cell::OnceCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::git::{ApplyOutcome, DefaultGitOperations, GitOperations};
use crate::patch::Patch;
use crate::patch_repo::{CheckReport, PatchRepo};
use crate::state::{Conflict, WorkingState};

/// Reportable state of a working-repo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    Unlinked,
    NoPatchesApplied,
    AllPatchesApplied,
    RestoreInProgress,
}

impl RepoStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RepoStatus::Unlinked => "unlinked",
            RepoStatus::NoPatchesApplied => "no-patches-applied",
            RepoStatus::AllPatchesApplied => "all-patches-applied",
            RepoStatus::RestoreInProgress => "restore-in-progress",
        }
    }
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status plus the details the CLI displays alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: RepoStatus,
    pub patch_repo: Option<PathBuf>,
    pub applied: usize,
    pub total: usize,
    pub conflict: Option<Conflict>,
}

/// A git working tree linked to a patch-repo.
pub struct WorkingRepo {
    path: PathBuf,
    git: Box<dyn GitOperations>,
    git_dir: OnceCell<PathBuf>,
    /// Log progress at debug rather than info level.
    pub quiet: bool,
}

impl WorkingRepo {
    /// Binds to the git tree at `path` using the system `git`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let git = Box::new(DefaultGitOperations::new(path.clone()));
        Self::with_operations(path, git)
    }

    /// Binds to `path` with a custom `GitOperations` implementation.
    pub fn with_operations(path: impl Into<PathBuf>, git: Box<dyn GitOperations>) -> Self {
        Self {
            path: path.into(),
            git,
            git_dir: OnceCell::new(),
            quiet: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn git_dir(&self) -> Result<&Path> {
        if let Some(dir) = self.git_dir.get() {
            return Ok(dir);
        }
        let dir = self.git.git_dir()?;
        Ok(self.git_dir.get_or_init(|| dir))
    }

    fn load_state(&self) -> Result<WorkingState> {
        WorkingState::load(self.git_dir()?)
    }

    fn store_state(&self, state: &WorkingState) -> Result<()> {
        state.save(self.git_dir()?)
    }

    fn progress(&self, message: fmt::Arguments<'_>) {
        if self.quiet {
            debug!("{}", message);
        } else {
            info!("{}", message);
        }
    }

    fn linked_repo(state: &WorkingState) -> Result<PatchRepo> {
        let path = state.patch_repo.as_ref().ok_or(Error::NotLinked)?;
        PatchRepo::open(path)
    }

    fn ensure_no_conflict(state: &WorkingState) -> Result<()> {
        match &state.conflict {
            Some(conflict) => Err(Error::RestoreInProgress {
                patch: conflict.patch.clone(),
            }),
            None => Ok(()),
        }
    }

    fn ensure_clean_tree(&self) -> Result<()> {
        if self.git.is_dirty()? {
            return Err(Error::UncommittedChanges);
        }
        Ok(())
    }

    /// The linked patch-repo.
    pub fn patch_repo(&self) -> Result<PatchRepo> {
        Self::linked_repo(&self.load_state()?)
    }

    /// Links this working-repo to the patch-repo at `path`.
    pub fn link(&self, path: &Path) -> Result<()> {
        let mut state = self.load_state()?;
        if let Some(existing) = &state.patch_repo {
            return Err(Error::AlreadyLinked {
                path: existing.clone(),
            });
        }
        PatchRepo::open(path)?;
        let target = fs::canonicalize(path)?;
        self.progress(format_args!("Linking to {}", target.display()));
        state.patch_repo = Some(target);
        self.store_state(&state)
    }

    /// Removes the link. Refused while a restore is stopped, and while
    /// patches are applied unless `force` is set.
    pub fn unlink(&self, force: bool) -> Result<()> {
        let state = self.load_state()?;
        if !state.is_linked() {
            return Err(Error::NotLinked);
        }
        Self::ensure_no_conflict(&state)?;
        if state.applied > 0 {
            if !force {
                return Err(Error::PatchesApplied {
                    count: state.applied,
                });
            }
            warn!(
                "Unlinking with {} patch(es) still applied; they stay in history as ordinary commits",
                state.applied
            );
        }
        self.store_state(&WorkingState::default())
    }

    /// Current state for display. Never mutates anything.
    ///
    /// `AllPatchesApplied` means the whole series is in the tree. When the
    /// series has grown past the applied count (another working-repo appended
    /// to a shared patch-repo) the tree is reported as `NoPatchesApplied`,
    /// since `restore` is the way forward; the counts tell the two apart.
    pub fn status(&self) -> Result<StatusReport> {
        let state = self.load_state()?;
        if !state.is_linked() {
            return Ok(StatusReport {
                status: RepoStatus::Unlinked,
                patch_repo: None,
                applied: 0,
                total: 0,
                conflict: None,
            });
        }
        let total = Self::linked_repo(&state)?.series()?.len();
        let status = if state.conflict.is_some() {
            RepoStatus::RestoreInProgress
        } else if state.applied > 0 && state.applied >= total {
            RepoStatus::AllPatchesApplied
        } else {
            RepoStatus::NoPatchesApplied
        };
        Ok(StatusReport {
            status,
            patch_repo: state.patch_repo,
            applied: state.applied,
            total,
            conflict: state.conflict,
        })
    }

    /// Captures each commit of `(since, HEAD]` as a patch appended to the
    /// series. The commits are already in the tree, so they count as applied.
    ///
    /// Returns the names of the new patches in commit order.
    pub fn save(&self, since: &str, prefix: Option<&str>) -> Result<Vec<String>> {
        let mut state = self.load_state()?;
        let repo = Self::linked_repo(&state)?;
        Self::ensure_no_conflict(&state)?;
        self.ensure_clean_tree()?;
        let total = repo.series()?.len();
        if state.applied != total {
            return Err(Error::SeriesNotApplied {
                applied: state.applied,
                total,
            });
        }

        let prefix = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());
        let base = self.git.resolve_ref(since)?;
        let commits = self.git.diff_range(&base, prefix)?;

        let mut saved = Vec::new();
        for commit in commits {
            if commit.diff.trim().is_empty() {
                warn!(
                    "Skipping {} ({}): no changes{}",
                    commit.id,
                    commit.subject,
                    prefix.map(|p| format!(" under {}", p)).unwrap_or_default()
                );
                continue;
            }
            let name = repo.unique_name(&commit.subject)?;
            let mut patch = Patch::new(name.clone(), commit.subject, commit.diff);
            patch.author = Some(commit.author).filter(|a| !a.trim().is_empty());
            patch.body = commit.body;
            patch.prefix = prefix.map(str::to_string);
            patch.depends_on = repo.infer_dependencies(&patch)?;
            repo.add(&patch)?;

            if state.applied == 0 {
                state.base = Some(base.clone());
            }
            state.applied += 1;
            self.store_state(&state)?;

            self.progress(format_args!("Saved {}", name));
            saved.push(name);
        }
        Ok(saved)
    }

    /// Applies the unapplied remainder of the series, in order, committing
    /// each patch. Stops at the first patch that does not apply cleanly and
    /// leaves the tree in the conflict state for `resolve`, `skip` or `abort`.
    ///
    /// Returns the names of the patches applied by this call.
    pub fn restore(&self) -> Result<Vec<String>> {
        let mut state = self.load_state()?;
        let repo = Self::linked_repo(&state)?;
        Self::ensure_no_conflict(&state)?;
        self.ensure_clean_tree()?;

        if state.applied >= repo.series()?.len() {
            self.progress(format_args!("All patches already applied"));
            return Ok(Vec::new());
        }

        let restore_start = self.git.head()?;
        let applied_before = state.applied;
        if state.applied == 0 {
            state.base = Some(restore_start.clone());
        }
        self.apply_series(&repo, &mut state, restore_start, applied_before)
    }

    fn apply_series(
        &self,
        repo: &PatchRepo,
        state: &mut WorkingState,
        restore_start: String,
        applied_before: usize,
    ) -> Result<Vec<String>> {
        let series = repo.series()?;
        let mut applied = Vec::new();

        while let Some(name) = series.get(state.applied) {
            let patch = repo.lookup(name)?;
            self.progress(format_args!("Applying {}", name));

            match self.git.apply(&patch.diff, patch.prefix.as_deref())? {
                ApplyOutcome::Clean => {
                    self.git
                        .commit(&patch.commit_message(), patch.author.as_deref())?;
                    state.applied += 1;
                    self.store_state(state)?;
                    applied.push(patch.name);
                }
                ApplyOutcome::Conflicted(files) => {
                    state.conflict = Some(Conflict {
                        patch: patch.name.clone(),
                        files: files.clone(),
                        restore_start,
                        applied_before,
                    });
                    self.store_state(state)?;
                    return Err(Error::PatchDidNotApplyCleanly {
                        patch: patch.name,
                        files,
                    });
                }
            }
        }

        self.progress(format_args!(
            "{} of {} patches applied",
            state.applied,
            series.len()
        ));
        Ok(applied)
    }

    fn current_conflict(state: &WorkingState) -> Result<Conflict> {
        state.conflict.clone().ok_or(Error::NoRestoreInProgress)
    }

    /// Refreshes the conflicting patch from the staged resolution, commits
    /// it, and continues the restore.
    ///
    /// Returns the names of the patches committed by this call, starting with
    /// the resolved one.
    pub fn resolve(&self) -> Result<Vec<String>> {
        let mut state = self.load_state()?;
        let repo = Self::linked_repo(&state)?;
        let conflict = Self::current_conflict(&state)?;

        let unresolved = self.git.conflicted_files()?;
        if !unresolved.is_empty() {
            return Err(Error::UnresolvedConflicts { files: unresolved });
        }
        if repo.series()?.position(&conflict.patch) != Some(state.applied) {
            return Err(Error::PatchNotFound {
                name: conflict.patch,
            });
        }
        let mut patch = repo.lookup(&conflict.patch)?;
        let diff = self.git.staged_diff(patch.prefix.as_deref())?;
        if diff.trim().is_empty() {
            return Err(Error::EmptyResolution { patch: patch.name });
        }

        patch.diff = diff;
        repo.refresh(&patch)?;
        self.git
            .commit(&patch.commit_message(), patch.author.as_deref())?;
        state.applied += 1;
        state.conflict = None;
        self.store_state(&state)?;
        self.progress(format_args!("Resolved {}", patch.name));

        let mut applied = vec![patch.name];
        applied.extend(self.apply_series(
            &repo,
            &mut state,
            conflict.restore_start,
            conflict.applied_before,
        )?);
        Ok(applied)
    }

    /// Drops the conflicting patch from the patch-repo, discards its partial
    /// application, and continues the restore.
    ///
    /// Returns the names of the patches applied after the skipped one.
    pub fn skip(&self) -> Result<Vec<String>> {
        let mut state = self.load_state()?;
        let repo = Self::linked_repo(&state)?;
        let conflict = Self::current_conflict(&state)?;

        self.git.revert_to("HEAD")?;
        match repo.remove(&conflict.patch) {
            Ok(()) => {}
            Err(Error::PatchNotFound { name }) => debug!("{} already removed", name),
            Err(e) => return Err(e),
        }
        state.conflict = None;
        self.store_state(&state)?;
        self.progress(format_args!("Skipped {}", conflict.patch));

        self.apply_series(
            &repo,
            &mut state,
            conflict.restore_start,
            conflict.applied_before,
        )
    }

    /// Returns the tree and applied count to where they were before the
    /// stopped restore began.
    pub fn abort(&self) -> Result<()> {
        let mut state = self.load_state()?;
        Self::linked_repo(&state)?;
        let conflict = Self::current_conflict(&state)?;

        self.git.revert_to(&conflict.restore_start)?;
        state.applied = conflict.applied_before;
        if state.applied == 0 {
            state.base = None;
        }
        state.conflict = None;
        self.store_state(&state)?;
        self.progress(format_args!("Aborted restore at {}", conflict.patch));
        Ok(())
    }

    /// Resets the tree to the commit preceding the first applied patch.
    ///
    /// Returns how many patches were rolled back.
    pub fn rollback(&self) -> Result<usize> {
        let mut state = self.load_state()?;
        Self::linked_repo(&state)?;
        Self::ensure_no_conflict(&state)?;
        if state.applied == 0 {
            return Err(Error::NoPatchesApplied);
        }
        self.ensure_clean_tree()?;

        let target = state
            .base
            .clone()
            .unwrap_or_else(|| format!("HEAD~{}", state.applied));
        self.git.revert_to(&target)?;

        let count = state.applied;
        state.applied = 0;
        state.base = None;
        self.store_state(&state)?;
        self.progress(format_args!("Rolled back {} patch(es)", count));
        Ok(count)
    }

    /// Consistency report for the linked patch-repo.
    pub fn check_patch_repo(&self) -> Result<CheckReport> {
        self.patch_repo()?.check()
    }
}
