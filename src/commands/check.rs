//! # Check Command Implementation
//!
//! `ply check` cross-references the linked patch-repo's series against the
//! patch files on disk. It prints `OK`, or `INCONSISTENT` followed by the
//! series entries without a file and the files without a series entry, and
//! then exits non-zero.
//!
//! This command never modifies anything.

use anyhow::Result;
use clap::Args;

use plypatch::output::{marker, Marker};
use plypatch::patch_repo::CheckReport;

use super::Context;

/// Perform a health check on the patch-repo
#[derive(Args, Debug)]
pub struct CheckArgs {}

/// Execute the `check` command.
pub fn execute(_args: CheckArgs, ctx: &Context) -> Result<()> {
    let report = ctx
        .working_repo()
        .check_patch_repo()
        .map_err(|e| ctx.explain(e))?;

    let glyph = if report.is_ok() {
        marker(&ctx.out, Marker::Ok)
    } else {
        marker(&ctx.out, Marker::Error)
    };
    println!("{} {}", glyph, report.label().to_uppercase());
    print!("{}", render_details(&report));

    report.into_result()?;
    Ok(())
}

fn render_details(report: &CheckReport) -> String {
    let mut text = String::new();
    if let CheckReport::Inconsistent {
        missing_file,
        orphan_file,
    } = report
    {
        if !missing_file.is_empty() {
            text.push_str("Entry in series file but patch not present:\n");
            for name in missing_file {
                text.push_str(&format!("\t- {}\n", name));
            }
        }
        if !orphan_file.is_empty() {
            text.push_str("Patch is present but no entry in series file:\n");
            for name in orphan_file {
                text.push_str(&format!("\t- {}\n", name));
            }
        }
    }
    text
}
