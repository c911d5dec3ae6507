//! CLI-level integration tests: spawn the real binary via `assert_cmd`
//! and assert on exit status and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn faxc() -> Command {
    Command::cargo_bin("faxc").expect("faxc binary built")
}

#[test]
fn missing_command_fails_with_nonzero_exit() {
    faxc()
        .assert()
        .failure()
        .stderr(predicate::str::contains("command argument missing"));
}

#[test]
fn unknown_flag_fails() {
    faxc()
        .arg("compile")
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown argument"));
}

#[test]
fn unknown_command_fails() {
    faxc()
        .arg("launch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command"));
}

#[test]
fn compile_missing_input_file_fails() {
    faxc()
        .arg("compile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input file"));
}

#[test]
fn compile_rejects_malformed_source() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("bad.fax");
    std::fs::write(&input, "a + b c").expect("write fixture");

    faxc()
        .arg("compile")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing failed"));
}
