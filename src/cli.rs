//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use plypatch::defaults::LOG_ENV;
use plypatch::output::OutputConfig;

use crate::commands::{self, Context};

/// ply: git-based patch management
#[derive(Parser, Debug)]
#[command(name = "ply")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        env = LOG_ENV,
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,

    /// Show progress for each patch
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Working-repo to operate on
    #[arg(
        short = 'C',
        long,
        global = true,
        value_name = "DIR",
        env = "PLY_WORKING_REPO",
        default_value = "."
    )]
    directory: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Abort in-progress restore operation
    Abort(commands::abort::AbortArgs),
    /// Perform a health check on the patch-repo
    Check(commands::check::CheckArgs),
    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
    /// Graph patch dependencies
    Graph(commands::graph::GraphArgs),
    /// Initialize a new patch-repo
    Init(commands::init::InitArgs),
    /// Link a working-repo to a patch-repo
    Link(commands::link::LinkArgs),
    /// Mark conflicts for a patch as resolved and continue applying the rest
    /// of the series
    Resolve(commands::resolve::ResolveArgs),
    /// Apply the patch series to the current branch of the working-repo
    Restore(commands::restore::RestoreArgs),
    /// Roll back to the last upstream commit
    Rollback(commands::rollback::RollbackArgs),
    /// Save a range of commits to the patch-repo
    Save(commands::save::SaveArgs),
    /// Drop the conflicting patch from the patch-repo and continue applying
    /// the rest of the series
    Skip(commands::skip::SkipArgs),
    /// Show status of the working-repo
    Status(commands::status::StatusArgs),
    /// Unlink the working-repo from its patch-repo
    Unlink(commands::unlink::UnlinkArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        let ctx = Context {
            directory: self.directory,
            verbose: self.verbose,
            out: OutputConfig::from_env_and_flag(&self.color),
        };

        match self.command {
            Commands::Abort(args) => commands::abort::execute(args, &ctx),
            Commands::Check(args) => commands::check::execute(args, &ctx),
            Commands::Completions(args) => commands::completions::execute(args),
            Commands::Graph(args) => commands::graph::execute(args, &ctx),
            Commands::Init(args) => commands::init::execute(args, &ctx),
            Commands::Link(args) => commands::link::execute(args, &ctx),
            Commands::Resolve(args) => commands::resolve::execute(args, &ctx),
            Commands::Restore(args) => commands::restore::execute(args, &ctx),
            Commands::Rollback(args) => commands::rollback::execute(args, &ctx),
            Commands::Save(args) => commands::save::execute(args, &ctx),
            Commands::Skip(args) => commands::skip::execute(args, &ctx),
            Commands::Status(args) => commands::status::execute(args, &ctx),
            Commands::Unlink(args) => commands::unlink::execute(args, &ctx),
        }
    }

    fn init_logging(&self) {
        let mut level = LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Warn);
        if self.verbose && level < LevelFilter::Info {
            level = LevelFilter::Info;
        }
        // A logger may already be installed when driven from tests.
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .format_target(false)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ply", "status", "-v", "-C", "/tmp/work"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.directory, PathBuf::from("/tmp/work"));
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_save_requires_since() {
        assert!(Cli::try_parse_from(["ply", "save"]).is_err());
        let cli = Cli::try_parse_from(["ply", "save", "HEAD~2", "--prefix", "lib"]).unwrap();
        match cli.command {
            Commands::Save(args) => {
                assert_eq!(args.since, "HEAD~2");
                assert_eq!(args.prefix.as_deref(), Some("lib"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["ply", "--log-level", "loud", "status"]).is_err());
    }
}
