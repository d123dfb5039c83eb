//! End-to-end tests for `ply init` and `ply link`/`ply unlink`.

mod common;

use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_creates_empty_series() {
    let fixture = GitFixture::new();

    fixture
        .ply()
        .arg("init")
        .arg(fixture.patches())
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Initialized empty patch-repo"));

    assert!(fixture.patches().join("series").is_file());
    assert!(fixture.series().is_empty());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_twice_fails() {
    let fixture = GitFixture::new();
    fixture.ply().arg("init").arg(fixture.patches()).assert().success();

    fixture
        .ply()
        .arg("init")
        .arg(fixture.patches())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_link_and_unlink() {
    let fixture = GitFixture::new();
    fixture.ply().arg("init").arg(fixture.patches()).assert().success();

    fixture
        .ply()
        .arg("link")
        .arg(fixture.patches())
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked to"));
    fixture
        .ply()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("no-patches-applied\n"));

    fixture
        .ply()
        .arg("link")
        .arg(fixture.patches())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Already linked"));

    fixture.ply().arg("unlink").assert().success();
    fixture
        .ply()
        .arg("status")
        .assert()
        .success()
        .stdout("unlinked\n");
    fixture
        .ply()
        .arg("unlink")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not linked"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_link_to_uninitialized_directory_fails() {
    let fixture = GitFixture::new();

    fixture
        .ply()
        .arg("link")
        .arg(fixture.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not a patch-repo"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_directory_flag_selects_working_repo() {
    let fixture = GitFixture::new();
    fixture.ply().arg("init").arg(fixture.patches()).assert().success();

    let mut cmd = cargo_bin_cmd!("ply");
    cmd.current_dir(fixture.path())
        .env("NO_COLOR", "1")
        .arg("-C")
        .arg(fixture.work())
        .arg("link")
        .arg(fixture.patches())
        .assert()
        .success();

    fixture
        .ply()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("no-patches-applied"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_relative_link_path_follows_directory_flag() {
    let fixture = GitFixture::new();
    fixture.ply().arg("init").arg(fixture.patches()).assert().success();

    // From the fixture root, `../patches` would point outside it.
    let mut cmd = cargo_bin_cmd!("ply");
    cmd.current_dir(fixture.path())
        .env("NO_COLOR", "1")
        .arg("-C")
        .arg("work")
        .arg("link")
        .arg("../patches")
        .assert()
        .success();

    fixture
        .ply()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            fixture.patches().canonicalize().unwrap().display().to_string(),
        ));
}
