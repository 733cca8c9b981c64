//! Lexical scanner
//!
//! Splits a single line into typed tokens. Used only by the fallback
//! path, so it must accept any text: anything it cannot make sense of
//! (an unterminated string, a stray byte) becomes an `Other` token
//! instead of an error.

use crate::text::{Position, TextRange};

/// Token kinds the scanner distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    String,
    Comment,
    Number,
    Operator,
    Ident,
    Other,
}

/// A token borrowed from the scanned line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::new(
            Position::new(self.start_line, self.start_col),
            Position::new(self.end_line, self.end_col),
        )
    }
}

/// Operators and punctuation, longest first
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "**", "//", "==", "!=", "<=", ">=", "->", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=", "<<", ">>", "+", "-", "*", "/", "%", "@",
    "&", "|", "^", "~", "<", ">", "=", ".", ",", ":", ";", "(", ")", "[", "]", "{", "}",
];

/// Scan one line lazily
pub fn scan(line_no: usize, line: &str) -> Scanner<'_> {
    Scanner {
        line,
        line_no,
        pos: 0,
        col: 0,
    }
}

/// Iterator over the tokens of a line
pub struct Scanner<'a> {
    line: &'a str,
    line_no: usize,
    /// Byte position
    pos: usize,
    /// Char column matching `pos`
    col: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn token(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
        let text = &self.line[self.pos..self.pos + len];
        let width = text.chars().count();
        let token = Token {
            kind,
            text,
            start_line: self.line_no,
            start_col: self.col,
            end_line: self.line_no,
            end_col: self.col + width,
        };
        self.pos += len;
        self.col += width;
        token
    }

    /// Length of a quoted string starting at `quote_at`, if terminated
    fn string_len(&self, quote_at: usize) -> Option<usize> {
        let rest = self.rest();
        let quote = rest[quote_at..].chars().next()?;
        let mut escaped = false;
        for (i, c) in rest[quote_at + 1..].char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return Some(quote_at + 1 + i + c.len_utf8());
            }
        }
        None
    }

    fn number_len(&self) -> usize {
        let bytes = self.rest().as_bytes();
        let mut i = 0;
        let digits = |i: &mut usize| {
            while *i < bytes.len() && (bytes[*i].is_ascii_digit() || bytes[*i] == b'_') {
                *i += 1;
            }
        };
        digits(&mut i);
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
            digits(&mut i);
        }
        if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
            let mut j = i + 1;
            if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                j += 1;
            }
            if j < bytes.len() && bytes[j].is_ascii_digit() {
                i = j;
                digits(&mut i);
            }
        }
        if i < bytes.len() && (bytes[i] == b'j' || bytes[i] == b'J') {
            i += 1;
        }
        i
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_string_prefix(word: &str) -> bool {
    word.len() <= 2 && word.chars().all(|c| matches!(c.to_ascii_lowercase(), 'r' | 'b' | 'u' | 'f'))
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        // Skip whitespace
        while let Some(c) = self.rest().chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
            self.col += 1;
        }

        let rest = self.rest();
        let c = rest.chars().next()?;

        if c == '#' {
            return Some(self.token(TokenKind::Comment, rest.len()));
        }

        if c == '"' || c == '\'' {
            return Some(match self.string_len(0) {
                Some(len) => self.token(TokenKind::String, len),
                None => self.token(TokenKind::Other, rest.len()),
            });
        }

        let next_is_digit = rest[c.len_utf8()..].starts_with(|n: char| n.is_ascii_digit());
        if c.is_ascii_digit() || (c == '.' && next_is_digit) {
            let len = self.number_len();
            return Some(self.token(TokenKind::Number, len.max(1)));
        }

        if is_ident_start(c) {
            let len = rest
                .char_indices()
                .find(|&(_, ch)| !is_ident_continue(ch))
                .map_or(rest.len(), |(i, _)| i);
            let after = rest[len..].chars().next();
            if matches!(after, Some('"' | '\'')) && is_string_prefix(&rest[..len]) {
                return Some(match self.string_len(len) {
                    Some(total) => self.token(TokenKind::String, total),
                    None => self.token(TokenKind::Other, rest.len()),
                });
            }
            return Some(self.token(TokenKind::Ident, len));
        }

        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            return Some(self.token(TokenKind::Operator, op.len()));
        }

        Some(self.token(TokenKind::Other, c.len_utf8()))
    }
}
