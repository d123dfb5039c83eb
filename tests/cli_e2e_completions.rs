//! End-to-end tests for `ply completions`.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_completions_bash() {
    cargo_bin_cmd!("ply")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_ply()"));
}

#[test]
fn test_completions_zsh() {
    cargo_bin_cmd!("ply")
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef ply"));
}

#[test]
fn test_completions_unknown_shell() {
    cargo_bin_cmd!("ply")
        .args(["completions", "tcsh"])
        .assert()
        .code(2);
}
