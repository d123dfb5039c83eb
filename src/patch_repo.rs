//! # Patch Repository
//!
//! A `PatchRepo` is a directory holding one file per patch plus the `series`
//! manifest that orders them. It is independent of any working tree; a
//! working-repo links to it by path.
//!
//! ## Invariant
//!
//! Every name in the series has exactly one patch file and every patch file
//! is named in the series. All mutating methods here keep that invariant;
//! [`PatchRepo::check`] reports (but never repairs) divergence introduced by
//! hand edits.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use crate::defaults::{PATCH_EXTENSION, SERIES_FILE};
use crate::error::{Error, Result};
use crate::filesystem::{list_visible_files, write_atomic};
use crate::graph::DependencyGraph;
use crate::patch::{slugify, validate_name, Patch};
use crate::series::Series;

/// Result of a patch-repo consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckReport {
    /// Series and patch files agree.
    Ok,
    /// Series and patch files disagree.
    Inconsistent {
        /// Named in the series but no file on disk.
        missing_file: Vec<String>,
        /// File on disk but not named in the series.
        orphan_file: Vec<String>,
    },
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckReport::Ok)
    }

    /// Short status label, `ok` or `inconsistent`.
    pub fn label(&self) -> &'static str {
        match self {
            CheckReport::Ok => "ok",
            CheckReport::Inconsistent { .. } => "inconsistent",
        }
    }

    /// Converts an inconsistent report into [`Error::InconsistentRepo`].
    pub fn into_result(self) -> Result<()> {
        match self {
            CheckReport::Ok => Ok(()),
            CheckReport::Inconsistent {
                missing_file,
                orphan_file,
            } => Err(Error::InconsistentRepo {
                missing_file,
                orphan_file,
            }),
        }
    }
}

/// Directory of patch files plus the series manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRepo {
    path: PathBuf,
}

impl PatchRepo {
    /// Refers to a patch-repo at `path` without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens an existing, initialized patch-repo.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let repo = Self::new(path);
        if !repo.is_initialized() {
            return Err(Error::NotAPatchRepo { path: repo.path });
        }
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn series_path(&self) -> PathBuf {
        self.path.join(SERIES_FILE)
    }

    fn patch_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn is_initialized(&self) -> bool {
        self.series_path().is_file()
    }

    /// Creates the directory and an empty series.
    pub fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::RepoAlreadyInitialized {
                path: self.path.clone(),
            });
        }
        fs::create_dir_all(&self.path)?;
        write_atomic(&self.series_path(), "")?;
        debug!("Initialized patch-repo at {}", self.path.display());
        Ok(())
    }

    /// Reads the series manifest.
    pub fn series(&self) -> Result<Series> {
        let text = fs::read_to_string(self.series_path()).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotAPatchRepo {
                path: self.path.clone(),
            },
            _ => Error::Io(e),
        })?;
        Ok(Series::parse(&text))
    }

    fn write_series(&self, series: &Series) -> Result<()> {
        write_atomic(&self.series_path(), &series.render())
    }

    /// Loads a patch by name.
    pub fn lookup(&self, name: &str) -> Result<Patch> {
        validate_name(name)?;
        let text = fs::read_to_string(self.patch_path(name)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::PatchNotFound {
                name: name.to_string(),
            },
            _ => Error::Io(e),
        })?;
        Patch::parse(name, &text)
    }

    /// Loads every patch in series order.
    pub fn patches(&self) -> Result<Vec<Patch>> {
        self.series()?.iter().map(|name| self.lookup(name)).collect()
    }

    /// Writes the patch file and appends it to the end of the series.
    pub fn add(&self, patch: &Patch) -> Result<()> {
        validate_name(&patch.name)?;
        let mut series = self.series()?;
        if series.contains(&patch.name) || self.patch_path(&patch.name).exists() {
            return Err(Error::PatchAlreadyExists {
                name: patch.name.clone(),
            });
        }
        write_atomic(&self.patch_path(&patch.name), &patch.render())?;
        series.push(patch.name.clone());
        self.write_series(&series)?;
        debug!("Added {} to {}", patch.name, self.path.display());
        Ok(())
    }

    /// Rewrites the content of a patch already in the series.
    pub fn refresh(&self, patch: &Patch) -> Result<()> {
        validate_name(&patch.name)?;
        if !self.series()?.contains(&patch.name) {
            return Err(Error::PatchNotFound {
                name: patch.name.clone(),
            });
        }
        write_atomic(&self.patch_path(&patch.name), &patch.render())?;
        debug!("Refreshed {}", patch.name);
        Ok(())
    }

    /// Deletes the patch file and its series entry.
    pub fn remove(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let mut series = self.series()?;
        let path = self.patch_path(name);
        let in_series = series.remove(name);
        if !in_series && !path.exists() {
            return Err(Error::PatchNotFound {
                name: name.to_string(),
            });
        }
        if path.exists() {
            fs::remove_file(&path)?;
        }
        if in_series {
            self.write_series(&series)?;
        }
        debug!("Removed {} from {}", name, self.path.display());
        Ok(())
    }

    /// A patch name derived from `subject` that is not used yet.
    pub fn unique_name(&self, subject: &str) -> Result<String> {
        let series = self.series()?;
        let slug = slugify(subject)?;
        let taken = |name: &str| series.contains(name) || self.patch_path(name).exists();

        let mut candidate = format!("{}{}", slug, PATCH_EXTENSION);
        let mut counter = 2;
        while taken(&candidate) {
            candidate = format!("{}-{}{}", slug, counter, PATCH_EXTENSION);
            counter += 1;
        }
        Ok(candidate)
    }

    /// Patches earlier in the series that `patch` depends on: for each file
    /// it touches, the most recent series patch touching the same file.
    pub fn infer_dependencies(&self, patch: &Patch) -> Result<BTreeSet<String>> {
        let files = patch.touched_files()?;
        let mut remaining: BTreeSet<&str> = files.iter().map(String::as_str).collect();
        let mut deps = BTreeSet::new();

        for earlier in self.patches()?.iter().rev() {
            if remaining.is_empty() {
                break;
            }
            if earlier.name == patch.name {
                continue;
            }
            let earlier_files = earlier.touched_files()?;
            let overlap: Vec<&str> = remaining
                .iter()
                .copied()
                .filter(|file| earlier_files.contains(*file))
                .collect();
            if !overlap.is_empty() {
                deps.insert(earlier.name.clone());
                for file in overlap {
                    remaining.remove(file);
                }
            }
        }
        Ok(deps)
    }

    /// Cross-references the series against the directory listing.
    pub fn check(&self) -> Result<CheckReport> {
        let series = self.series()?;
        let on_disk: BTreeSet<String> = list_visible_files(&self.path)?
            .into_iter()
            .filter(|name| name != SERIES_FILE)
            .collect();

        let mut missing_file = Vec::new();
        for name in series.iter() {
            if !on_disk.contains(name) && !missing_file.iter().any(|m| m == name) {
                missing_file.push(name.to_string());
            }
        }
        let orphan_file: Vec<String> = on_disk
            .into_iter()
            .filter(|name| !series.contains(name))
            .collect();

        if missing_file.is_empty() && orphan_file.is_empty() {
            Ok(CheckReport::Ok)
        } else {
            Ok(CheckReport::Inconsistent {
                missing_file,
                orphan_file,
            })
        }
    }

    /// Builds the dependency graph over the series.
    ///
    /// Patches whose file is missing appear as nodes without edges.
    pub fn patch_dependency_graph(&self) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        for name in self.series()?.iter() {
            match self.lookup(name) {
                Ok(patch) => graph.add_patch(name, &patch.depends_on),
                Err(Error::PatchNotFound { .. }) => {
                    debug!("{} is missing, graphing without dependencies", name);
                    graph.add_patch(name, &BTreeSet::<String>::new());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(graph)
    }
}
