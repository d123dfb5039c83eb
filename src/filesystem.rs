//! # Filesystem Helpers
//!
//! Small wrappers around `std::fs` shared by the patch-repo and the working
//! state store: atomic whole-file writes and listing the plain files of a
//! directory.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Writes `contents` to `path` by writing a hidden sibling temp file and
/// renaming it into place, so readers never observe a partial file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a file path: {}", path.display()),
            ))
        })?
        .to_string_lossy();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Names of the regular, non-hidden files directly inside `dir`, sorted.
pub fn list_visible_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deep/nested/file.txt");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_dir.path().join("deep/nested/.file.txt.tmp").exists());
    }

    #[test]
    fn test_list_visible_files_skips_hidden_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::create_dir_all(dir.join(".git")).unwrap();
        fs::create_dir_all(dir.join("subdir")).unwrap();
        fs::write(dir.join("b.patch"), "b").unwrap();
        fs::write(dir.join("a.patch"), "a").unwrap();
        fs::write(dir.join(".hidden"), "h").unwrap();

        assert_eq!(list_visible_files(dir).unwrap(), ["a.patch", "b.patch"]);
    }
}
