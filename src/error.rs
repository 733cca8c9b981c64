//! Error types for pyhl

use std::fmt;

use thiserror::Error;

use crate::syntax::Category;
use crate::text::{Position, TextRange};

/// Result type alias for pyhl operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// A structural parse failure, reported at the first offending token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 0-based line of the first error
    pub line: usize,
    /// 0-based character column of the first error
    pub col: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            col,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line + 1, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Highlighter error types
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("syntax error at {0}")]
    Parse(#[from] ParseError),

    #[error("cannot load grammar: {0}")]
    Language(String),

    #[error("cannot tag {category} at {range}: {reason}")]
    TagApplication {
        category: Category,
        range: TextRange,
        reason: String,
    },

    #[error("position {0} is outside the buffer")]
    OutOfRange(Position),

    #[error("theme error: {0}")]
    Theme(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Message(String),
}
