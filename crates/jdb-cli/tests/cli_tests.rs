// cli_tests.rs — end-to-end exit-code contract for the jdb binary:
// a session that runs out of input must take the whole process down.

use assert_cmd::Command;
use predicates::prelude::*;

fn jdb() -> Command {
    Command::cargo_bin("jdb").expect("jdb binary builds")
}

#[test]
fn test_empty_stdin_exits_nonzero() {
    jdb()
        .write_stdin("")
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("Entering jdb:"))
        .stderr(predicate::str::contains("end of input"));
}

#[test]
fn test_quit_exits_nonzero() {
    jdb()
        .write_stdin("q\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("aborted"));
}

#[test]
fn test_continue_exits_cleanly() {
    jdb()
        .write_stdin("c\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Entering jdb:\n(jdb) "));
}

#[test]
fn test_print_value_in_session() {
    jdb()
        .write_stdin("p x\nc\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("DeviceArray(2., dtype=float32)"));
}

#[test]
fn test_vmap_opens_one_session_per_lane() {
    jdb()
        .arg("--backend")
        .arg("vmap")
        .write_stdin("c\nc\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Entering jdb:\n(jdb) Entering jdb:\n(jdb) ",
        ));
}
