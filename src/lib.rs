//! # Plypatch Library
//!
//! This library provides the core functionality behind the `ply` command-line
//! tool: keeping a stack of patches stored in one directory (the
//! *patch-repo*) in sync with their application state in a git working tree
//! (the *working-repo*).
//!
//! ## Quick Example
//!
//! ```
//! use plypatch::patch::Patch;
//! use plypatch::patch_repo::PatchRepo;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let repo = PatchRepo::new(dir.path().join("patches"));
//! repo.initialize().unwrap();
//!
//! let diff = "diff --git a/README b/README\n--- a/README\n+++ b/README\n@@ -1 +1 @@\n-teh\n+the\n";
//! repo.add(&Patch::new("fix-typo.patch", "Fix typo", diff)).unwrap();
//!
//! assert_eq!(repo.series().unwrap().names(), ["fix-typo.patch"]);
//! assert!(repo.check().unwrap().is_ok());
//! ```
//!
//! ## Core Concepts
//!
//! - **Patch (`patch`)**: A named diff with author, message, optional path
//!   prefix and descriptive dependency metadata, stored as one file.
//! - **Series (`series`)**: The ordered manifest of patch names. Series order
//!   is the only apply order; dependencies never reorder it.
//! - **Patch-repo (`patch_repo`)**: The directory holding the series and the
//!   patch files, with consistency checking and the dependency graph
//!   (`graph`).
//! - **Working-repo (`working_repo`)**: The live tree and its state machine:
//!   `link`, `save`, `restore`, `resolve`, `skip`, `abort`, `rollback`,
//!   `status`. Its persisted state (`state`) lives in the git directory.
//! - **Version-control engine (`git`)**: The `GitOperations` trait the state
//!   machine drives, implemented on top of the system `git`.

pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod graph;
pub mod output;
pub mod patch;
pub mod patch_repo;
pub mod series;
pub mod state;
pub mod working_repo;
