//! # Restore Command Implementation
//!
//! `ply restore` applies the unapplied part of the series, one commit per
//! patch. When a patch does not apply cleanly the restore stops, the tree is
//! left with conflict markers and the guidance for `resolve`, `skip` and
//! `abort` is printed.

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};

use super::Context;

/// Apply the patch series to the current branch of the working-repo
#[derive(Args, Debug)]
pub struct RestoreArgs {}

/// Execute the `restore` command.
pub fn execute(_args: RestoreArgs, ctx: &Context) -> Result<()> {
    let applied = ctx
        .working_repo()
        .restore()
        .map_err(|e| ctx.explain(e))?;

    if applied.is_empty() {
        println!("{} All patches already applied", marker(&ctx.out, Marker::Ok));
    } else {
        ctx.print_applied(&applied);
    }
    Ok(())
}
