//! API to control the interpreter.

use std::io::prelude::*;

use crate::diag::Diagnostics;
use crate::eval::Evaluator;
use crate::parser::Parser;
use crate::scanner::Scanner;

/// A tree-walk interpreter session.
///
/// The global environment persists across [`Interpreter::run`] calls, so a
/// definition made in one call is visible in the next:
///
/// ```
/// use loxley::interpreter::Interpreter;
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut session = Interpreter::new(&mut output);
///
/// let program = r#"
///     fun max(x, y) {
///         if (x > y) { return x; }
///         return y;
///     }
/// "#;
/// assert!(session.run(program).is_clean());
/// assert!(session.run("print max(10, 20);").is_clean());
/// assert!(session.run("print max(5, 4);").is_clean());
///
/// assert_eq!(output, b"20\n5\n");
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    evaluator: Evaluator<'t, W>,
}

/// How a run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The program ran to completion.
    Ok,
    /// Scanning or parsing reported at least one error; nothing was
    /// evaluated.
    ParseError,
    /// Evaluation was aborted by a runtime error.
    RuntimeError,
}

/// The result of running one chunk of source.
#[derive(Debug)]
pub struct RunOutcome {
    /// Rendered diagnostics, in the order they were reported.
    pub diagnostics: Vec<String>,
    pub status: RunStatus,
}

impl RunOutcome {
    pub fn is_clean(&self) -> bool {
        self.status == RunStatus::Ok
    }
}

impl<'t, W: Write> Interpreter<'t, W> {
    /// Create a session for batch execution: expression statements are
    /// evaluated for their side effects only.
    pub fn new(output: &'t mut W) -> Interpreter<'t, W> {
        Interpreter {
            evaluator: Evaluator::new(output, false),
        }
    }

    /// Create an interactive session: the value of a top-level expression
    /// statement is printed, the way a REPL answers back.
    pub fn new_interactive(output: &'t mut W) -> Interpreter<'t, W> {
        Interpreter {
            evaluator: Evaluator::new(output, true),
        }
    }

    /// Scan, parse and evaluate `source` against the session's globals.
    ///
    /// Scanning and parsing always run to completion; if either reported an
    /// error the program is not evaluated and the outcome is
    /// [`RunStatus::ParseError`].
    pub fn run(&mut self, source: &str) -> RunOutcome {
        let mut diags = Diagnostics::new();
        let tokens = Scanner::new(source, &mut diags).scan_tokens();
        let statements = Parser::new(tokens, &mut diags).parse();

        if diags.had_parse_error() {
            return RunOutcome {
                diagnostics: diags.into_reports(),
                status: RunStatus::ParseError,
            };
        }

        if let Err(e) = self.evaluator.interpret(&statements) {
            diags.runtime_error(&e.to_string(), e.line());
        }
        let status = if diags.had_runtime_error() {
            RunStatus::RuntimeError
        } else {
            RunStatus::Ok
        };
        RunOutcome {
            diagnostics: diags.into_reports(),
            status,
        }
    }
}
