//! # CLI Command Implementations
//!
//! One module per `ply` subcommand. Each module contains:
//! - An `Args` struct with the command-specific arguments, derived using `clap`.
//! - An `execute` function that calls into the `plypatch` library and prints
//!   the outcome.
//!
//! Errors from the library are passed through [`Context::explain`], which
//! prints recovery guidance for conflicts before the error is reported.

pub mod abort;
pub mod check;
pub mod completions;
pub mod graph;
pub mod init;
pub mod link;
pub mod resolve;
pub mod restore;
pub mod rollback;
pub mod save;
pub mod skip;
pub mod status;
pub mod unlink;

use std::path::PathBuf;

use plypatch::error::Error;
use plypatch::output::{marker, Marker, OutputConfig};
use plypatch::working_repo::WorkingRepo;

/// Global settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub directory: PathBuf,
    pub verbose: bool,
    pub out: OutputConfig,
}

impl Context {
    /// The working-repo named by `-C`, with verbosity applied.
    pub fn working_repo(&self) -> WorkingRepo {
        let mut working = WorkingRepo::new(&self.directory);
        working.quiet = !self.verbose;
        working
    }

    /// Prints recovery guidance for `err` to stderr and converts it for
    /// reporting.
    pub fn explain(&self, err: Error) -> anyhow::Error {
        if let Some(text) = guidance(&err) {
            eprintln!("{} {}", marker(&self.out, Marker::Error), text);
        }
        anyhow::Error::new(err)
    }

    /// Prints one line per applied patch.
    pub fn print_applied(&self, names: &[String]) {
        for name in names {
            println!("{} Applied {}", marker(&self.out, Marker::Apply), name);
        }
    }
}

/// Operator guidance for errors that leave something to do by hand.
pub fn guidance(err: &Error) -> Option<String> {
    match err {
        Error::PatchDidNotApplyCleanly { patch, files } => {
            let mut text = format!("Patch {} did not apply cleanly.", patch);
            if !files.is_empty() {
                text.push_str("\n\nConflicting files:");
                for file in files {
                    text.push_str(&format!("\n\t- {}", file));
                }
            }
            text.push_str(
                "\n\nTo fix:\n\
                 \n\t1) Fix conflicts in affected files\
                 \n\t2) `git add` affected files\
                 \n\t3) Run `ply resolve` to refresh the patch and apply the rest\
                 \n\t   of the patches in the series.\
                 \n\nOr run `ply skip` to drop the patch, or `ply abort` to undo the restore.",
            );
            Some(text)
        }
        Error::UnresolvedConflicts { .. } => {
            Some("Fix the conflicts and `git add` the files before resolving.".to_string())
        }
        _ => None,
    }
}
