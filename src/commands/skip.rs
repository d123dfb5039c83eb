//! # Skip Command Implementation
//!
//! `ply skip` permanently drops the patch a restore stopped on: the patch
//! file and its series entry are deleted, its partial application is
//! discarded, and the rest of the series is applied.

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};

use super::Context;

/// Skip the conflicting patch, remove it from the patch-repo and continue
#[derive(Args, Debug)]
pub struct SkipArgs {}

/// Execute the `skip` command.
pub fn execute(_args: SkipArgs, ctx: &Context) -> Result<()> {
    let working = ctx.working_repo();
    let skipped = working
        .status()
        .map_err(|e| ctx.explain(e))?
        .conflict
        .map(|c| c.patch);

    let applied = working.skip().map_err(|e| ctx.explain(e))?;

    if let Some(name) = skipped {
        println!("{} Skipped {}", marker(&ctx.out, Marker::Warning), name);
    }
    ctx.print_applied(&applied);
    Ok(())
}
