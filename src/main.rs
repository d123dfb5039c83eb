//! # Ply CLI
//!
//! Binary entry point for the `ply` command-line tool.
//!
//! It parses arguments with `clap`, sets up logging, and dispatches to one
//! command module per subcommand. Everything else lives in the `plypatch`
//! library so the binary stays a thin wrapper.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
