//! # Unlink Command Implementation

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};

use super::Context;

/// Unlink the working-repo from its patch-repo
#[derive(Args, Debug)]
pub struct UnlinkArgs {
    /// Unlink even though patches are applied; they stay in history as
    /// ordinary commits.
    #[arg(long)]
    pub force: bool,
}

/// Execute the `unlink` command.
pub fn execute(args: UnlinkArgs, ctx: &Context) -> Result<()> {
    ctx.working_repo()
        .unlink(args.force)
        .map_err(|e| ctx.explain(e))?;
    println!("{} Unlinked", marker(&ctx.out, Marker::Ok));
    Ok(())
}
