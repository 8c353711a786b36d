//! End-to-end tests driving the compiled binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn bin() -> Command {
    Command::cargo_bin("loxley").expect("binary present")
}

fn write_script(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp script");
    write!(file, "{}", source).expect("write temp script");
    file
}

#[test]
fn arithmetic_precedence() {
    let script = write_script("print 1 + 2 * 3;");
    bin().arg(script.path()).assert().success().stdout("7\n");
}

#[test]
fn string_concatenation() {
    let script = write_script("var a = \"hi\"; var b = \" there\"; print a + b;");
    bin()
        .arg(script.path())
        .assert()
        .success()
        .stdout("hi there\n");
}

#[test]
fn while_loop_counts() {
    let script = write_script("var i = 0; while (i < 3) { print i; i = i + 1; }");
    bin()
        .arg(script.path())
        .assert()
        .success()
        .stdout("0\n1\n2\n");
}

#[test]
fn for_loop_counts() {
    let script = write_script("for (var i = 0; i < 3; i = i + 1) print i;");
    bin()
        .arg(script.path())
        .assert()
        .success()
        .stdout("0\n1\n2\n");
}

#[test]
fn recursive_fibonacci() {
    let script = write_script(
        "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);",
    );
    bin().arg(script.path()).assert().success().stdout("55\n");
}

#[test]
fn undefined_variable_exits_70() {
    let script = write_script("print x;");
    bin()
        .arg(script.path())
        .assert()
        .failure()
        .code(70)
        .stdout("")
        .stderr(predicate::str::contains("Undefined variable 'x'."))
        .stderr(predicate::str::contains("[line 1]"));
}

#[test]
fn mixed_addition_exits_70() {
    let script = write_script("print \"a\" + 1;");
    bin()
        .arg(script.path())
        .assert()
        .failure()
        .code(70)
        .stderr(predicate::str::contains(
            "Operands must be two numbers or two strings.",
        ));
}

#[test]
fn parse_error_exits_65_without_evaluating() {
    let script = write_script("print 1;\n1 + ;");
    bin()
        .arg(script.path())
        .assert()
        .failure()
        .code(65)
        .stdout("")
        .stderr(predicate::str::contains(
            "[line 2] Error at ';': Expect expression.",
        ));
}

#[test]
fn scan_error_exits_65() {
    let script = write_script("print @;");
    bin()
        .arg(script.path())
        .assert()
        .failure()
        .code(65)
        .stderr(predicate::str::contains(
            "[line 1] Error: Unexpected character.",
        ));
}

#[test]
fn extra_arguments_print_usage_and_exit_64() {
    bin()
        .args(["a.lox", "b.lox"])
        .assert()
        .failure()
        .code(64)
        .stdout(predicate::str::contains("Usage: loxley [script]"));
}

#[test]
fn repl_prompts_and_echoes_expression_values() {
    bin()
        .write_stdin("1 + 2;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(">>> "))
        .stdout(predicate::str::contains("3\n"));
}

#[test]
fn repl_keeps_globals_across_lines() {
    bin()
        .write_stdin("var a = 1;\nprint a + 1;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2\n"));
}

#[test]
fn repl_recovers_after_an_error_and_exits_0_at_eof() {
    bin()
        .write_stdin("print missing;\nprint 1;\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Undefined variable 'missing'."))
        .stdout(predicate::str::contains("1\n"));
}
