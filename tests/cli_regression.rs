// Regression tests for the coolast binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

const ALL_KINDS: &str = "tests/fixtures/all_kinds.ast";
const ALL_KINDS_INDENT2: &str = "tests/fixtures/all_kinds_indent2.ast";

fn coolast() -> Command {
    Command::cargo_bin("coolast").unwrap()
}

#[test]
fn cli_print_reproduces_canonical_input() {
    let expected = fs::read_to_string(ALL_KINDS).unwrap();
    coolast()
        .args(["print", ALL_KINDS])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn cli_print_reads_stdin() {
    coolast()
        .arg("print")
        .write_stdin("#1 _program #1 _class A Object \"a.cl\" ( )")
        .assert()
        .success()
        .stdout("#1\n_program\n #1\n _class\n  A\n  Object\n  \"a.cl\"\n  (\n  )\n");
}

#[test]
fn cli_check_accepts_matching_indent() {
    coolast()
        .args(["check", ALL_KINDS])
        .assert()
        .success()
        .stderr(contains("checked 1 file(s), 0 failed"));
    coolast()
        .args(["check", "--indent", "2", ALL_KINDS_INDENT2])
        .assert()
        .success();
}

#[test]
fn cli_check_reports_mismatch() {
    coolast()
        .args(["--no-color", "check", ALL_KINDS_INDENT2])
        .assert()
        .failure()
        .stderr(contains("MISMATCH").and(contains("1 failed")));
}

#[test]
fn cli_reports_miette_diagnostics_on_error() {
    coolast()
        .arg("print")
        .write_stdin("#1 _class (A) ()")
        .assert()
        .failure()
        .stderr(contains("coolast::syntax").and(contains("line 1")));
}

#[test]
fn cli_ast_emits_json() {
    coolast()
        .args(["ast", "--json", ALL_KINDS])
        .assert()
        .success()
        .stdout(contains("\"name\": \"Main\"").and(contains("\"type\": \"SELF_TYPE\"")));
}

#[test]
fn cli_missing_file_is_io_error() {
    coolast()
        .args(["print", "tests/fixtures/does_not_exist.ast"])
        .assert()
        .failure()
        .stderr(contains("coolast::io"));
}

#[test]
fn cli_test_runs_suites() {
    coolast()
        .args(["--no-color", "test", "tests/suites"])
        .assert()
        .success()
        .stderr(contains("Test summary"));
}
