//! # Save Command Implementation
//!
//! `ply save <since>` turns every commit in `since..HEAD` into a patch,
//! appended to the series in commit order. The commits stay in the tree and
//! count as applied.
//!
//! With `--prefix <dir>` only changes under `dir` are captured and the diff
//! paths are stored relative to it, so the patch can later be applied to a
//! tree where that subtree lives elsewhere.

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};

use super::Context;

/// Save a range of commits to the patch-repo
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Commit to start after; every commit in `SINCE..HEAD` is saved.
    #[arg(value_name = "SINCE")]
    pub since: String,

    /// Only capture changes under this directory.
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<String>,
}

/// Execute the `save` command.
pub fn execute(args: SaveArgs, ctx: &Context) -> Result<()> {
    let saved = ctx
        .working_repo()
        .save(&args.since, args.prefix.as_deref())
        .map_err(|e| ctx.explain(e))?;

    if saved.is_empty() {
        println!("No commits to save since {}", args.since);
        return Ok(());
    }
    for name in &saved {
        println!("{} Saved {}", marker(&ctx.out, Marker::Save), name);
    }
    Ok(())
}
