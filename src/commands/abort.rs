//! # Abort Command Implementation

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};

use super::Context;

/// Abort the in-progress restore operation
#[derive(Args, Debug)]
pub struct AbortArgs {}

/// Execute the `abort` command.
pub fn execute(_args: AbortArgs, ctx: &Context) -> Result<()> {
    ctx.working_repo().abort().map_err(|e| ctx.explain(e))?;
    println!("{} Restore aborted", marker(&ctx.out, Marker::Ok));
    Ok(())
}
