//! # Status Command Implementation
//!
//! `ply status` prints the working-repo state label on the first line
//! (`unlinked`, `no-patches-applied`, `all-patches-applied` or
//! `restore-in-progress`), followed by the linked patch-repo, the
//! applied/total counts, and for a stopped restore the patch and its
//! conflicted files.
//!
//! This command is read-only.

use anyhow::Result;
use clap::Args;

use plypatch::working_repo::{RepoStatus, StatusReport};

use super::Context;

/// Show status of the working-repo
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Execute the `status` command.
pub fn execute(_args: StatusArgs, ctx: &Context) -> Result<()> {
    let report = ctx.working_repo().status().map_err(|e| ctx.explain(e))?;
    print!("{}", render(&report, &ctx.out.status_label(report.status)));
    Ok(())
}

fn render(report: &StatusReport, label: &str) -> String {
    let mut text = format!("{}\n", label);
    if report.status == RepoStatus::Unlinked {
        return text;
    }
    if let Some(path) = &report.patch_repo {
        text.push_str(&format!("patch-repo: {}\n", path.display()));
    }
    text.push_str(&format!("applied: {}/{}\n", report.applied, report.total));
    if let Some(conflict) = &report.conflict {
        text.push_str(&format!("stopped at: {}\n", conflict.patch));
        for file in &conflict.files {
            text.push_str(&format!("\t- {}\n", file));
        }
        text.push_str("Use `ply resolve`, `ply skip` or `ply abort` to continue\n");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use plypatch::state::Conflict;
    use std::path::PathBuf;

    #[test]
    fn test_render_unlinked() {
        let report = StatusReport {
            status: RepoStatus::Unlinked,
            patch_repo: None,
            applied: 0,
            total: 0,
            conflict: None,
        };
        assert_eq!(render(&report, "unlinked"), "unlinked\n");
    }

    #[test]
    fn test_render_conflict() {
        let report = StatusReport {
            status: RepoStatus::RestoreInProgress,
            patch_repo: Some(PathBuf::from("/srv/patches")),
            applied: 1,
            total: 2,
            conflict: Some(Conflict {
                patch: "add-feature.patch".to_string(),
                files: vec!["foo.c".to_string()],
                restore_start: "abc".to_string(),
                applied_before: 0,
            }),
        };
        let text = render(&report, "restore-in-progress");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "restore-in-progress");
        assert_eq!(lines[1], "patch-repo: /srv/patches");
        assert_eq!(lines[2], "applied: 1/2");
        assert_eq!(lines[3], "stopped at: add-feature.patch");
        assert_eq!(lines[4], "\t- foo.c");
    }
}
