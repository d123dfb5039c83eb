//! # Init Command Implementation
//!
//! `ply init <path>` creates an empty patch-repo: the directory (if needed)
//! and an empty `series` manifest. It does not touch any working-repo, so it
//! can run anywhere.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};
use plypatch::patch_repo::PatchRepo;

use super::Context;

/// Initialize a new patch-repo
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to the patch-repo to create
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, ctx: &Context) -> Result<()> {
    let repo = PatchRepo::new(&args.path);
    repo.initialize().map_err(|e| ctx.explain(e))?;
    println!(
        "{} Initialized empty patch-repo in {}",
        marker(&ctx.out, Marker::Ok),
        args.path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plypatch::output::OutputConfig;
    use tempfile::TempDir;

    fn ctx() -> Context {
        Context {
            directory: PathBuf::from("."),
            verbose: false,
            out: OutputConfig::without_color(),
        }
    }

    #[test]
    fn test_init_creates_patch_repo() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("patches");

        execute(InitArgs { path: path.clone() }, &ctx()).unwrap();

        assert!(PatchRepo::new(&path).is_initialized());
    }

    #[test]
    fn test_init_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_path_buf();

        execute(InitArgs { path: path.clone() }, &ctx()).unwrap();
        let err = execute(InitArgs { path }, &ctx()).unwrap_err();

        assert!(err.to_string().contains("already"));
    }
}
