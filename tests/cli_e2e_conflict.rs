//! End-to-end tests for a restore that stops on a conflict, and the
//! `resolve`, `skip` and `abort` ways out of it.

mod common;

use common::prelude::*;

/// Linked fixture whose only patch conflicts with an upstream commit. The
/// restore has been run and stopped.
fn stopped_restore() -> GitFixture {
    let fixture = GitFixture::new();
    fixture.ply().arg("init").arg(fixture.patches()).assert().success();
    fixture.ply().arg("link").arg(fixture.patches()).assert().success();
    fixture.commit_file("README", "line two\n", "Change greeting");
    fixture.ply().args(["save", "HEAD~1"]).assert().success();
    fixture.ply().arg("rollback").assert().success();
    fixture.commit_file("README", "line upstream\n", "Upstream rewrite");

    fixture
        .ply()
        .arg("restore")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Patch change-greeting.patch did not apply cleanly.",
        ))
        .stderr(predicate::str::contains("\t- README"))
        .stderr(predicate::str::contains("ply resolve"));
    fixture
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_status_during_conflict() {
    let fixture = stopped_restore();

    fixture
        .ply()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("restore-in-progress\n"))
        .stdout(predicate::str::contains("stopped at: change-greeting.patch"));

    fixture
        .ply()
        .arg("rollback")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Restore in progress"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_resolve_after_fixing() {
    let fixture = stopped_restore();

    fixture
        .ply()
        .arg("resolve")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unresolved conflicts"));

    fixture.write("README", "line resolved\n");
    fixture.git(&["add", "README"]);

    fixture
        .ply()
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied change-greeting.patch"));
    fixture
        .ply()
        .arg("status")
        .assert()
        .stdout(predicate::str::starts_with("all-patches-applied"));
    let patch = std::fs::read_to_string(fixture.patches().join("change-greeting.patch")).unwrap();
    assert!(patch.contains("+line resolved"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_skip_drops_patch() {
    let fixture = stopped_restore();

    fixture
        .ply()
        .arg("skip")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped change-greeting.patch"));

    assert!(fixture.series().is_empty());
    assert_eq!(fixture.read("README"), "line upstream\n");
    fixture.ply().arg("check").assert().success();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_abort_returns_to_upstream() {
    let fixture = stopped_restore();

    fixture.ply().arg("abort").assert().success();

    assert!(fixture.is_clean());
    assert_eq!(fixture.read("README"), "line upstream\n");
    assert_eq!(fixture.series(), ["change-greeting.patch"]);
    fixture
        .ply()
        .arg("abort")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No restore in progress"));
}
