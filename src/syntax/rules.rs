//! Pattern rules for fallback highlighting
//!
//! This module defines the regex rule types the fallback path uses
//! when the buffer does not parse.

use regex::Regex;
use tracing::warn;

use super::category::Category;

/// A single-line pattern rule
///
/// Matches a regex pattern and assigns a category to the match.
pub struct PatternRule {
    /// Compiled regex pattern
    pub pattern: Regex,
    /// Category to assign to matches
    pub category: Category,
}

impl PatternRule {
    /// Create a new pattern rule; `name` identifies it in the log when
    /// the pattern does not compile
    pub fn new(name: &str, pattern: &str, category: Category) -> Option<Self> {
        let pattern = compile(name, pattern)?;
        Some(Self { pattern, category })
    }

    /// All non-overlapping matches as byte ranges
    pub fn find_all<'t>(&'t self, text: &'t str) -> impl Iterator<Item = (usize, usize)> + 't {
        self.pattern.find_iter(text).map(|m| (m.start(), m.end()))
    }
}

/// A construct that may span lines (triple-quoted strings)
///
/// Applied to the whole buffer rather than line by line, so a
/// construct opened on one line is closed wherever its end
/// delimiter appears.
pub struct MultilineRule {
    /// Pattern that starts the construct
    pub start: Regex,
    /// Pattern that ends the construct
    pub end: Regex,
    /// Category for this construct
    pub category: Category,
    /// Escape character (usually backslash)
    pub escape_char: Option<char>,
}

impl MultilineRule {
    /// Create a new multiline rule
    pub fn new(name: &str, start_pattern: &str, end_pattern: &str, category: Category) -> Option<Self> {
        let start = compile(name, start_pattern)?;
        let end = compile(name, end_pattern)?;
        Some(Self {
            start,
            end,
            category,
            escape_char: None,
        })
    }

    /// Create a multiline rule with escape support
    pub fn with_escape(
        name: &str,
        start_pattern: &str,
        end_pattern: &str,
        category: Category,
        escape_char: char,
    ) -> Option<Self> {
        let mut rule = Self::new(name, start_pattern, end_pattern, category)?;
        rule.escape_char = Some(escape_char);
        Some(rule)
    }

    /// Find start of this construct in text
    pub fn find_start(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        if start >= text.len() {
            return None;
        }
        self.start.find(&text[start..]).map(|m| (start + m.start(), start + m.end()))
    }

    /// Find end of this construct in text, respecting escapes
    pub fn find_end(&self, text: &str, start: usize) -> Option<usize> {
        if start >= text.len() {
            return None;
        }

        let search_text = &text[start..];
        let Some(escape_char) = self.escape_char else {
            return self.end.find(search_text).map(|m| start + m.end());
        };

        let mut pos = 0;
        while pos < search_text.len() {
            let m = self.end.find(&search_text[pos..])?;
            let match_start = pos + m.start();
            let escapes = search_text[..match_start]
                .chars()
                .rev()
                .take_while(|&c| c == escape_char)
                .count();
            if escapes % 2 == 1 {
                // Odd number of escapes = escaped; resume one char later
                pos = match_start
                    + search_text[match_start..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                continue;
            }
            return Some(start + pos + m.end());
        }
        None
    }
}

fn compile(name: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(rule = name, error = %e, "invalid highlight rule");
            None
        }
    }
}
