//! Character-level scanner: turns source text into a stream of [`RawToken`]s.
//!
//! Deliberately bracket-unaware — [`crate::tree::Builder`] owns the frame
//! stack and decides what a `(`/`,`/`)` *means*. This mirrors the split
//! spec.md §4.1/§4.2 draw between lexer and tree builder, even though the
//! system this was distilled from (`pitybas/parse.py`) does both in one
//! pass. Scanning rules themselves (numeric trailing dot, sign-fusion,
//! string termination) follow `pitybas/parse.py`'s `Parser.token`/`number`/
//! `string` exactly.

use crate::error::ParseError;
use crate::token::catalog;
use crate::token::kind::TokenKind;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum RawToken {
    Open(char),
    Close(char),
    Comma,
    Reserved(TokenKind),
    Number(Value),
    Str(String),
    ListName(String),
    MatrixName(String),
    RowBreak,
    Eof,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    pub line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// The next non-space character, without consuming it. Used by the
    /// tree builder to decide whether a list/matrix name reference is
    /// actually an indexing operation (`L1(3)`).
    pub fn peek_char(&self) -> Option<char> {
        let mut i = self.pos;
        while matches!(self.chars.get(i), Some(c) if *c == ' ' || *c == '\t') {
            i += 1;
        }
        self.chars.get(i).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn remaining(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn advance_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    /// Pull the next token. `operand_context` tells the scanner whether a
    /// bare `-` immediately before a digit should fuse into a negative
    /// numeric literal (only valid where an operand is expected) or stand
    /// alone as the `Minus` operator.
    pub fn next_raw(&mut self, operand_context: bool) -> Result<RawToken, ParseError> {
        self.skip_spaces();

        let Some(c) = self.peek() else {
            return Ok(RawToken::Eof);
        };

        if c == '\n' || c == ':' {
            self.advance();
            if c == '\n' {
                self.line += 1;
            }
            return Ok(RawToken::RowBreak);
        }

        if c == '"' {
            return self.scan_string();
        }

        if c == '-' && operand_context {
            if let Some(next) = self.peek_at(1) {
                if next.is_ascii_digit() || next == '.' {
                    return self.scan_number();
                }
            }
        }

        if c.is_ascii_digit() || c == '.' {
            return self.scan_number();
        }

        if c == '[' {
            if let Some(name) = self.try_matrix_ref() {
                return Ok(RawToken::MatrixName(name));
            }
            self.advance();
            return Ok(RawToken::Open('['));
        }

        if c == '(' || c == '{' {
            self.advance();
            return Ok(RawToken::Open(c));
        }

        if c == ')' || c == ']' || c == '}' {
            self.advance();
            return Ok(RawToken::Close(c));
        }

        if c == ',' {
            self.advance();
            return Ok(RawToken::Comma);
        }

        if let Some((key, kind)) = catalog::longest_match(&self.remaining()) {
            self.advance_n(key.chars().count());
            return Ok(RawToken::Reserved(kind.clone()));
        }

        if self.remaining().starts_with("prgm") {
            self.advance_n(4);
            let mut name = String::new();
            while let Some(c) = self.peek() {
                if c.is_alphanumeric() {
                    name.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                return Err(ParseError::new("malformed prgm call, missing name", self.line));
            }
            return Ok(RawToken::Reserved(TokenKind::PrgmCall(name)));
        }

        if c == '∟'
            || ((c == 'l' || c == 'L')
                && self
                    .peek_at(1)
                    .is_some_and(|n| n.is_ascii_uppercase() || n.is_ascii_digit()))
        {
            return self.scan_list_ref();
        }

        if self.remaining().starts_with("Str") && self.peek_at(3).is_some_and(|n| n.is_ascii_digit())
        {
            self.advance_n(3);
            let digit = self.advance().unwrap();
            return Ok(RawToken::Reserved(TokenKind::StrVar(
                digit.to_digit(10).unwrap() as u8,
            )));
        }

        if let Some(kind) = catalog::single_letter_var(c) {
            self.advance();
            return Ok(RawToken::Reserved(kind));
        }

        Err(ParseError::new(
            format!("unrecognized token near '{c}'"),
            self.line,
        ))
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(c) if c == ' ' || c == '\t' || c == '\r') {
            self.pos += 1;
        }
    }

    /// `[A]`: a single uppercase letter immediately wrapped in brackets.
    /// Anything else starting with `[` is a matrix literal's outer bracket.
    fn try_matrix_ref(&self) -> Option<String> {
        let name = self.peek_at(1)?;
        if name.is_ascii_uppercase() && self.peek_at(2) == Some(']') {
            Some(name.to_string())
        } else {
            None
        }
    }

    /// `l`/`L`/`∟` followed by `[A-Z0-9]+` (spec.md §4.1/§4.5): collect the
    /// full alphanumeric run, not just leading digits, so `∟AB` and `L1`
    /// both name a list.
    fn scan_list_ref(&mut self) -> Result<RawToken, ParseError> {
        self.advance(); // consume '∟', 'l', or 'L'
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_uppercase() || c.is_ascii_digit() {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(ParseError::new("malformed list name".to_string(), self.line));
        }
        Ok(RawToken::ListName(name))
    }

    /// Number literal. A trailing `.` with nothing after it is valid and
    /// equal to the integer part (spec.md §9 resolves this explicitly).
    fn scan_number(&mut self) -> Result<RawToken, ParseError> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.advance();
        }
        let mut saw_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else if c == '.' && !saw_dot {
                saw_dot = true;
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let cleaned = if text.ends_with('.') {
            let mut s = text.clone();
            s.pop();
            s
        } else {
            text.clone()
        };
        if saw_dot {
            let f: f64 = cleaned
                .parse()
                .map_err(|_| ParseError::new(format!("malformed number '{text}'"), self.line))?;
            Ok(RawToken::Number(Value::Float(f)))
        } else {
            let i: i64 = cleaned
                .parse()
                .map_err(|_| ParseError::new(format!("malformed number '{text}'"), self.line))?;
            Ok(RawToken::Number(Value::Int(i)))
        }
    }

    /// Per `pitybas/parse.py`'s `Parser.string`: terminated by a closing
    /// quote or end of line, whichever comes first (an unterminated
    /// string is not an error).
    fn scan_string(&mut self) -> Result<RawToken, ParseError> {
        self.advance(); // opening quote
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c == '"' {
                self.advance();
                break;
            }
            if c == '\n' {
                break;
            }
            s.push(c);
            self.advance();
        }
        Ok(RawToken::Str(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_simple_store() {
        let mut lex = Lexer::new("5→A");
        assert_eq!(
            lex.next_raw(true).unwrap(),
            RawToken::Number(Value::Int(5))
        );
        assert_eq!(
            lex.next_raw(false).unwrap(),
            RawToken::Reserved(TokenKind::Store)
        );
        assert_eq!(
            lex.next_raw(true).unwrap(),
            RawToken::Reserved(TokenKind::SimpleVar('A'))
        );
        assert_eq!(lex.next_raw(true).unwrap(), RawToken::Eof);
    }

    #[test]
    fn negative_number_fuses_sign_in_operand_context() {
        let mut lex = Lexer::new("-3");
        assert_eq!(
            lex.next_raw(true).unwrap(),
            RawToken::Number(Value::Int(-3))
        );
    }

    #[test]
    fn minus_stays_an_operator_outside_operand_context() {
        let mut lex = Lexer::new("-3");
        assert_eq!(
            lex.next_raw(false).unwrap(),
            RawToken::Reserved(TokenKind::Minus)
        );
    }

    #[test]
    fn trailing_dot_is_valid() {
        let mut lex = Lexer::new("5.");
        assert_eq!(
            lex.next_raw(true).unwrap(),
            RawToken::Number(Value::Float(5.0))
        );
    }

    #[test]
    fn matrix_reference_vs_matrix_literal() {
        let mut lex = Lexer::new("[A]");
        assert_eq!(
            lex.next_raw(true).unwrap(),
            RawToken::MatrixName("A".to_string())
        );

        let mut lex2 = Lexer::new("[1,2]");
        assert_eq!(lex2.next_raw(true).unwrap(), RawToken::Open('['));
    }

    #[test]
    fn function_catalog_match_consumes_paren() {
        let mut lex = Lexer::new("sin(30)");
        assert_eq!(
            lex.next_raw(true).unwrap(),
            RawToken::Reserved(TokenKind::Sin)
        );
        assert_eq!(
            lex.next_raw(true).unwrap(),
            RawToken::Number(Value::Int(30))
        );
        assert_eq!(lex.next_raw(false).unwrap(), RawToken::Close(')'));
    }
}
