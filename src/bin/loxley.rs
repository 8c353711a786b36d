//! Command-line driver.
//!
//! Without arguments it drops into an interactive read-evaluate-print loop;
//! with a single path it executes that script and exits. Diagnostics go to
//! stderr; the exit code distinguishes parse errors (65) from runtime
//! errors (70).

use std::env;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::process;

use anyhow::Context;

use loxley::interpreter::{Interpreter, RunOutcome, RunStatus};

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match args.as_slice() {
        [] => run_prompt()?,
        [path] => run_file(path)?,
        _ => {
            println!("Usage: loxley [script]");
            process::exit(64);
        }
    }
    Ok(())
}

fn report(outcome: &RunOutcome) {
    for diagnostic in &outcome.diagnostics {
        eprintln!("{}", diagnostic);
    }
}

fn run_file(path: &str) -> Result<(), anyhow::Error> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;

    let mut stdout = io::stdout();
    let mut session = Interpreter::new(&mut stdout);
    let outcome = session.run(&source);
    report(&outcome);

    match outcome.status {
        RunStatus::Ok => Ok(()),
        RunStatus::ParseError => process::exit(65),
        RunStatus::RuntimeError => process::exit(70),
    }
}

fn run_prompt() -> Result<(), anyhow::Error> {
    let stdin = io::stdin();
    let mut prompt_out = io::stdout();
    let mut session_out = io::stdout();

    let mut session = Interpreter::new_interactive(&mut session_out);

    let mut line = String::new();
    loop {
        prompt_out.write_all(b">>> ")?;
        prompt_out.flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        report(&session.run(&line));
    }

    Ok(())
}
