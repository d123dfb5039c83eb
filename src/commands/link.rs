//! # Link Command Implementation
//!
//! `ply link <path>` records the patch-repo the working-repo is bound to.
//! A working-repo is linked to at most one patch-repo at a time.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};

use super::Context;

/// Link a working-repo to a patch-repo
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Path to the patch-repo
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Execute the `link` command.
///
/// A relative path is taken relative to the working-repo directory, as with
/// `git -C`.
pub fn execute(args: LinkArgs, ctx: &Context) -> Result<()> {
    let target = ctx.directory.join(&args.path);
    ctx.working_repo()
        .link(&target)
        .map_err(|e| ctx.explain(e))?;
    println!(
        "{} Linked to {}",
        marker(&ctx.out, Marker::Ok),
        args.path.display()
    );
    Ok(())
}
