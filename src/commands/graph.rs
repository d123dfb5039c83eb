//! # Graph Command Implementation
//!
//! `ply graph` renders the `depends_on` relationships of the linked
//! patch-repo. The default output is a DOT digraph (pipe it into
//! `dot -Tpng`); `--format tree` prints an indented tree with each patch
//! above the patches it depends on.
//!
//! Dependencies are descriptive only. They never change the apply order.

use std::io;

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::Context;

/// Output format for the dependency graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Graphviz DOT
    #[default]
    Dot,
    /// Indented terminal tree
    Tree,
}

/// Graph patch dependencies
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = GraphFormat::Dot)]
    pub format: GraphFormat,
}

/// Execute the `graph` command.
pub fn execute(args: GraphArgs, ctx: &Context) -> Result<()> {
    let graph = ctx
        .working_repo()
        .patch_repo()
        .and_then(|repo| repo.patch_dependency_graph())
        .map_err(|e| ctx.explain(e))?;

    match args.format {
        GraphFormat::Dot => print!("{}", graph.to_dot()),
        GraphFormat::Tree => graph.write_tree(io::stdout())?,
    }
    Ok(())
}
