//! Lexical analyzer.

use crate::diag::Diagnostics;
use crate::token::{Literal, Token, TokenKind};

/// Turns a source string into a token sequence.
///
/// Scanning is a single pass with two cursors: `start` anchors the lexeme
/// being scanned, `current` is the read position. It is resilient:
/// unrecognized input is reported to the diagnostics sink and skipped, and
/// the scan always runs to the end of the source. The resulting list is
/// terminated by a synthetic `Eof` token carrying the final line number.
#[derive(Debug)]
pub struct Scanner<'s, 'd> {
    source: &'s str,
    diags: &'d mut Diagnostics,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl<'s, 'd> Scanner<'s, 'd> {
    pub fn new(source: &'s str, diags: &'d mut Diagnostics) -> Scanner<'s, 'd> {
        Scanner {
            source,
            diags,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, "", None, self.line));
        self.tokens
    }

    fn scan_token(&mut self) {
        let ch = self.advance();
        match ch {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '!' => {
                let kind = if self.match_char('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '/' => {
                if self.match_char('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            ' ' | '\r' | '\t' => (),
            '\n' => self.line += 1,
            '"' => self.string(),
            '0'..='9' => self.number(),
            ch if ch.is_ascii_alphabetic() || ch == '_' => self.identifier(),
            _ => self.diags.scan_error(self.line, "Unexpected character."),
        }
    }

    fn string(&mut self) {
        let opening_line = self.line;
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.diags.scan_error(opening_line, "Unterminated string.");
            return;
        }

        // Closing quote.
        self.advance();

        // The literal excludes the delimiting quotes.  No escape processing.
        let value = self.source[self.start + 1..self.current - 1].to_string();
        self.add_literal_token(TokenKind::String, Some(Literal::Str(value)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A '.' is part of the number only when digits follow it.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        match self.source[self.start..self.current].parse::<f64>() {
            Ok(n) => self.add_literal_token(TokenKind::Number, Some(Literal::Number(n))),
            Err(_) => self.diags.scan_error(self.line, "Invalid number literal."),
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let kind = keyword(&self.source[self.start..self.current]).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    fn advance(&mut self) -> char {
        let ch = self.source[self.current..].chars().next().unwrap_or('\0');
        self.current += ch.len_utf8();
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_literal_token(kind, None);
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = &self.source[self.start..self.current];
        self.tokens
            .push(Token::new(kind, lexeme, literal, self.line));
    }
}

const KEYWORDS: [(&str, TokenKind); 16] = [
    ("and", TokenKind::And),
    ("class", TokenKind::Class),
    ("else", TokenKind::Else),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("fun", TokenKind::Fun),
    ("if", TokenKind::If),
    ("nil", TokenKind::Nil),
    ("or", TokenKind::Or),
    ("print", TokenKind::Print),
    ("return", TokenKind::Return),
    ("super", TokenKind::Super),
    ("this", TokenKind::This),
    ("true", TokenKind::True),
    ("var", TokenKind::Var),
    ("while", TokenKind::While),
];

fn keyword(text: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(name, _)| *name == text)
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind::*;

    fn scan(input: &str) -> (Vec<Token>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let tokens = Scanner::new(input, &mut diags).scan_tokens();
        (tokens, diags)
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        let (tokens, diags) = scan(input);
        assert!(!diags.had_parse_error(), "unexpected diagnostics: {:?}", diags);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(
            kinds("(){},.-+;*/"),
            vec![
                LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus, Semicolon,
                Star, Slash, Eof
            ]
        );
    }

    #[test]
    fn one_or_two_char_operators() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![
                Bang, BangEqual, Equal, EqualEqual, Less, LessEqual, Greater, GreaterEqual, Eof
            ]
        );
    }

    #[test]
    fn two_char_operators_without_blanks() {
        assert_eq!(kinds("!=="), vec![BangEqual, Equal, Eof]);
        assert_eq!(kinds("<=>"), vec![LessEqual, Greater, Eof]);
    }

    #[test]
    fn blanks_are_ignored() {
        assert_eq!(kinds(" \t\r\n+"), vec![Plus, Eof]);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(kinds("true // false\nnil"), vec![True, Nil, Eof]);
    }

    #[test]
    fn number_literals() {
        let (tokens, _) = scan("42 4.2");
        assert_eq!(tokens[0].literal, Some(Literal::Number(42.0)));
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].literal, Some(Literal::Number(4.2)));
        assert_eq!(tokens[1].lexeme, "4.2");
    }

    #[test]
    fn trailing_dot_is_not_part_of_the_number() {
        let (tokens, _) = scan("123.");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![Number, Dot, Eof]
        );
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
    }

    #[test]
    fn leading_dot_is_not_part_of_the_number() {
        assert_eq!(kinds(".5"), vec![Dot, Number, Eof]);
    }

    #[test]
    fn string_literal_excludes_quotes() {
        let (tokens, _) = scan("\"hi there\"");
        assert_eq!(tokens[0].kind, String);
        assert_eq!(tokens[0].lexeme, "\"hi there\"");
        assert_eq!(tokens[0].literal, Some(Literal::Str("hi there".to_string())));
    }

    #[test]
    fn string_may_span_lines() {
        let (tokens, _) = scan("\"a\nb\" nil");
        assert_eq!(tokens[0].literal, Some(Literal::Str("a\nb".to_string())));
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_reports_opening_line() {
        let (tokens, diags) = scan("\"abc\ndef");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Eof);
        assert_eq!(diags.reports(), ["[line 1] Error: Unterminated string."]);
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            kinds("foo _bar t42 var varx"),
            vec![Identifier, Identifier, Identifier, Var, Identifier, Eof]
        );
    }

    #[test]
    fn all_reserved_words() {
        assert_eq!(
            kinds(
                "and class else false for fun if nil or print return super this true var while"
            ),
            vec![
                And, Class, Else, False, For, Fun, If, Nil, Or, Print, Return, Super, This, True,
                Var, While, Eof
            ]
        );
    }

    #[test]
    fn lines_are_tracked() {
        let (tokens, _) = scan("1\n2 3\n4");
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 2, 3, 3]);
    }

    #[test]
    fn unexpected_characters_are_reported_and_skipped() {
        let (tokens, diags) = scan("@+#");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![Plus, Eof]
        );
        assert_eq!(
            diags.reports(),
            [
                "[line 1] Error: Unexpected character.",
                "[line 1] Error: Unexpected character."
            ]
        );
    }

    #[test]
    fn eof_token_carries_final_line() {
        let (tokens, _) = scan("1\n\n");
        assert_eq!(tokens.last().map(|t| t.line), Some(3));
    }
}
