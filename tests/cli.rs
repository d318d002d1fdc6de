use assert_cmd::Command;
use predicates::prelude::*;

fn calc() -> Command {
    Command::cargo_bin("rpn_calc").expect("binary exists")
}

#[test]
fn infix_session() {
    calc()
        .write_stdin("infix\n(3 + 4) * 2\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("infix, postfix, or quit?"))
        .stdout(predicate::str::contains("Result: 14\n"));
}

#[test]
fn postfix_session_ends_with_input() {
    calc()
        .write_stdin("postfix\n8 3 - 2 -\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: 3\n"));
}

#[test]
fn session_reports_errors_and_continues() {
    calc()
        .arg("--start-line")
        .arg("5")
        .write_stdin("infix\n\"abc\ninfix\n1 + 1\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error, <stdin>:6:1: string is missing its closing '\"'"))
        .stdout(predicate::str::contains("Result: 2\n"));
}

#[test]
fn unknown_command_is_reported() {
    calc()
        .write_stdin("prefix\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("'prefix' is not a command"));
}

#[test]
fn evaluates_one_expression() {
    calc()
        .arg("--show-postfix")
        .arg("3 + 4 * 2")
        .assert()
        .success()
        .stdout("Postfix: 3 4 2 * +\nResult: 11\n");
}

#[test]
fn postfix_mode_prints_every_residual_value() {
    calc()
        .args(["--mode", "postfix", "1 2"])
        .assert()
        .success()
        .stdout("Result: 2\nResult: 1\n");
}

#[test]
fn unmatched_paren_fails() {
    calc()
        .arg("3 + 4)")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find '('"));
}

#[test]
fn leading_negative_number_is_an_expression() {
    calc()
        .args(["--", "-2 * 3"])
        .assert()
        .success()
        .stdout("Result: -6\n");
}

#[test]
fn expression_argument_is_one_line() {
    calc()
        .arg("1 + 1\n2")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("<string>:2:1: did not expect '2'"));
}
