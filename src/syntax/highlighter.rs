//! Syntax highlighting entry point
//!
//! Parses the buffer and classifies the tree; when the parse fails the
//! degraded fallback classifier is used instead.

use tracing::debug;

use super::classify::classify;
use super::fallback::classify_fallback;
use super::parser::ParserAdapter;
use super::python::PythonTables;
use super::style::Span;
use crate::error::{ParseError, Result};

/// Which classifier produced a set of spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightMode {
    /// Syntax tree classification
    Tree,
    /// Scanner/regex fallback after a parse failure
    Fallback,
    /// Highlighting is switched off
    Disabled,
}

/// Spans for one snapshot of the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlights {
    pub spans: Vec<Span>,
    pub mode: HighlightMode,
    /// Why the fallback was used
    pub parse_error: Option<ParseError>,
}

/// Main syntax highlighter
pub struct Highlighter {
    parser: ParserAdapter,
    tables: PythonTables,
    /// Whether syntax highlighting is enabled
    pub enabled: bool,
}

impl Highlighter {
    /// Create a highlighter with the default Python tables
    pub fn new() -> Result<Self> {
        Self::with_tables(PythonTables::new())
    }

    pub fn with_tables(tables: PythonTables) -> Result<Self> {
        Ok(Self {
            parser: ParserAdapter::new()?,
            tables,
            enabled: true,
        })
    }

    /// Parse without classifying, reporting the first syntax error
    pub fn check(&mut self, source: &str) -> Result<()> {
        self.parser.parse(source)?;
        Ok(())
    }

    /// Compute spans for the given source
    pub fn highlight(&mut self, source: &str) -> Highlights {
        if !self.enabled {
            return Highlights {
                spans: Vec::new(),
                mode: HighlightMode::Disabled,
                parse_error: None,
            };
        }

        match self.parser.parse(source) {
            Ok(tree) => {
                let spans = classify(&tree, &self.tables);
                debug!(nodes = tree.node_count(), spans = spans.len(), "classified syntax tree");
                Highlights {
                    spans,
                    mode: HighlightMode::Tree,
                    parse_error: None,
                }
            }
            Err(err) => {
                let spans = classify_fallback(source, &self.tables);
                debug!(error = %err, spans = spans.len(), "parse failed, using fallback scanner");
                Highlights {
                    spans,
                    mode: HighlightMode::Fallback,
                    parse_error: Some(err),
                }
            }
        }
    }

    /// Toggle syntax highlighting on/off
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HighlightError;
    use crate::syntax::Category;

    #[test]
    fn test_valid_source_uses_tree() {
        let mut highlighter = Highlighter::new().unwrap();
        let highlights = highlighter.highlight("x = 1\n");
        assert_eq!(highlights.mode, HighlightMode::Tree);
        assert!(highlights.parse_error.is_none());
        assert!(highlights.spans.iter().any(|s| s.category == Category::Number));
    }

    #[test]
    fn test_invalid_source_falls_back() {
        let mut highlighter = Highlighter::new().unwrap();
        let highlights = highlighter.highlight("def f(:\n    pass");
        assert_eq!(highlights.mode, HighlightMode::Fallback);
        assert!(highlights.parse_error.is_some());
        assert!(highlights.spans.iter().all(|s| s.category != Category::Function));
    }

    #[test]
    fn test_check_reports_first_syntax_error() {
        let mut highlighter = Highlighter::new().unwrap();
        assert!(highlighter.check("x = 1\n").is_ok());
        match highlighter.check("x = 1\n\ny = )\n") {
            Err(HighlightError::Parse(err)) => assert_eq!(err.line, 2),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_toggle_disables() {
        let mut highlighter = Highlighter::new().unwrap();
        highlighter.toggle();
        let highlights = highlighter.highlight("x = 1\n");
        assert_eq!(highlights.mode, HighlightMode::Disabled);
        assert!(highlights.spans.is_empty());
    }

    #[test]
    fn test_recovers_after_fix() {
        let mut highlighter = Highlighter::new().unwrap();
        assert_eq!(highlighter.highlight("if x\n").mode, HighlightMode::Fallback);
        assert_eq!(highlighter.highlight("if x:\n    pass\n").mode, HighlightMode::Tree);
    }
}
