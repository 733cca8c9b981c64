//! Syntax highlighting module
//!
//! This module provides the highlighting pipeline:
//! - Lexical scanning (fallback path only)
//! - Structural parsing into an owned syntax tree
//! - Classification of tree nodes into categories
//! - Colors and category spans

mod category;
mod classify;
mod fallback;
mod highlighter;
mod parser;
mod python;
mod rules;
mod scanner;
mod style;
mod tree;

pub use category::Category;
pub use classify::classify;
pub use fallback::{classify_fallback, triple_quoted_blocks};
pub use highlighter::{HighlightMode, Highlighter, Highlights};
pub use parser::ParserAdapter;
pub use python::{is_dunder, PythonTables};
pub use rules::{MultilineRule, PatternRule};
pub use scanner::{scan, Scanner, Token, TokenKind};
pub use style::{Color, Span};
pub use tree::{Alias, Ident, Literal, NodeKind, SyntaxNode, SyntaxTree, Walk};
