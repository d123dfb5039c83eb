//! # Resolve Command Implementation

use anyhow::Result;
use clap::Args;

use super::Context;

/// Mark conflicts for a patch as resolved and continue applying the series
#[derive(Args, Debug)]
pub struct ResolveArgs {}

/// Execute the `resolve` command.
///
/// The first name returned is the refreshed patch; the rest were applied
/// after it.
pub fn execute(_args: ResolveArgs, ctx: &Context) -> Result<()> {
    let applied = ctx
        .working_repo()
        .resolve()
        .map_err(|e| ctx.explain(e))?;
    ctx.print_applied(&applied);
    Ok(())
}
