//! Default values for plypatch.
//!
//! This module provides centralized file names and limits used across the
//! library and the CLI, ensuring consistency and avoiding duplication.

/// Name of the series manifest inside a patch-repo.
pub const SERIES_FILE: &str = "series";

/// Directory inside the working-repo's git directory that holds plypatch state.
pub const STATE_DIR: &str = "ply";

/// Name of the working state file inside [`STATE_DIR`].
pub const STATE_FILE: &str = "state.json";

/// Extension given to patch names generated from commit subjects.
pub const PATCH_EXTENSION: &str = ".patch";

/// Maximum length of the slug part of a generated patch name.
pub const MAX_SLUG_LEN: usize = 52;

/// Environment variable read for the default log filter.
pub const LOG_ENV: &str = "PLY_LOG";
