//! Error reporting shared by the scanner, parser and evaluator.

use crate::token::{Token, TokenKind};

/// Collects the errors reported while running one chunk of source.
///
/// The scanner and parser recover and keep going after an error, so their
/// reports accumulate here instead of aborting the stage that found them.
/// The evaluator adds at most one runtime report since a runtime error
/// aborts the run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    reports: Vec<String>,
    had_parse_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    /// Report an error found while scanning, before any token exists.
    pub fn scan_error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Report an error at a token.
    pub fn parse_error(&mut self, token: &Token, message: &str) {
        if token.kind == TokenKind::Eof {
            self.report(token.line, " at end", message);
        } else {
            let location = format!(" at '{}'", token.lexeme);
            self.report(token.line, &location, message);
        }
    }

    /// Report a runtime error; `line` attributes it to its source token
    /// when one is known.
    pub fn runtime_error(&mut self, message: &str, line: Option<usize>) {
        let report = match line {
            Some(line) => format!("{}\n[line {}]", message, line),
            None => message.to_string(),
        };
        self.reports.push(report);
        self.had_runtime_error = true;
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        self.reports
            .push(format!("[line {}] Error{}: {}", line, location, message));
        self.had_parse_error = true;
    }

    pub fn had_parse_error(&self) -> bool {
        self.had_parse_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reports(&self) -> &[String] {
        &self.reports
    }

    pub fn into_reports(self) -> Vec<String> {
        self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_report_has_no_location() {
        let mut diags = Diagnostics::new();
        diags.scan_error(3, "Unexpected character.");
        assert_eq!(diags.reports(), ["[line 3] Error: Unexpected character."]);
        assert!(diags.had_parse_error());
        assert!(!diags.had_runtime_error());
    }

    #[test]
    fn parse_report_quotes_the_lexeme() {
        let mut diags = Diagnostics::new();
        let token = Token::new(TokenKind::Semicolon, ";", None, 1);
        diags.parse_error(&token, "Expect expression.");
        assert_eq!(diags.reports(), ["[line 1] Error at ';': Expect expression."]);
    }

    #[test]
    fn parse_report_at_eof_says_at_end() {
        let mut diags = Diagnostics::new();
        let token = Token::new(TokenKind::Eof, "", None, 7);
        diags.parse_error(&token, "Expect ';' after value.");
        assert_eq!(
            diags.reports(),
            ["[line 7] Error at end: Expect ';' after value."]
        );
    }

    #[test]
    fn runtime_report_carries_the_line_on_a_second_row() {
        let mut diags = Diagnostics::new();
        diags.runtime_error("Undefined variable 'x'.", Some(2));
        assert_eq!(diags.reports(), ["Undefined variable 'x'.\n[line 2]"]);
        assert!(diags.had_runtime_error());
        assert!(!diags.had_parse_error());
    }
}
