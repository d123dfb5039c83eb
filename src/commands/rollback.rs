//! # Rollback Command Implementation
//!
//! `ply rollback` hard-resets the working-repo to the commit the first
//! applied patch was committed on, dropping every applied patch commit.

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};

use super::Context;

/// Roll back to the last upstream commit
#[derive(Args, Debug)]
pub struct RollbackArgs {}

/// Execute the `rollback` command.
pub fn execute(_args: RollbackArgs, ctx: &Context) -> Result<()> {
    let count = ctx
        .working_repo()
        .rollback()
        .map_err(|e| ctx.explain(e))?;
    println!(
        "{} Rolled back {} patch(es)",
        marker(&ctx.out, Marker::Ok),
        count
    );
    Ok(())
}
