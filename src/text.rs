//! Positions, ranges and byte/char conversion
//!
//! Positions follow text-widget conventions: lines are 0-based and
//! columns count characters, not bytes. The parser and the regex
//! engine both report byte offsets, so every pass builds a `LineIndex`
//! to translate between the two.

use std::fmt;

/// A cursor-like location in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// 0-based line number
    pub line: usize,
    /// 0-based column, in chars
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Same line, `n` characters to the right
    pub fn offset_cols(self, n: usize) -> Self {
        Self {
            line: self.line,
            col: self.col + n,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Widget-style "line.col" with 1-based lines
        write!(f, "{}.{}", self.line + 1, self.col)
    }
}

/// A half-open range of positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range on a single line
    pub const fn on_line(line: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            start: Position::new(line, start_col),
            end: Position::new(line, end_col),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this range contains a position
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Check if two ranges share at least one character
    pub fn overlaps(&self, other: &TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A selection between an anchor and the moving end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    /// The selected range with start <= end
    pub fn range(&self) -> TextRange {
        if self.anchor <= self.head {
            TextRange::new(self.anchor, self.head)
        } else {
            TextRange::new(self.head, self.anchor)
        }
    }
}

/// Line-start table for a snapshot of the buffer text
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset where each line starts
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a line, without its newline
    pub fn line(&self, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line_text = &self.text[start..end];
        Some(line_text.strip_suffix('\r').unwrap_or(line_text))
    }

    /// Convert a byte offset into a position
    pub fn position(&self, byte: usize) -> Option<Position> {
        if byte > self.text.len() || !self.text.is_char_boundary(byte) {
            return None;
        }
        let line = match self.line_starts.binary_search(&byte) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let col = self.text[self.line_starts[line]..byte].chars().count();
        Some(Position::new(line, col))
    }

    /// Convert a byte range into a text range
    pub fn range(&self, start: usize, end: usize) -> Option<TextRange> {
        Some(TextRange::new(self.position(start)?, self.position(end)?))
    }

    /// Convert a position into a byte offset
    ///
    /// A column equal to the line length addresses the end of the line.
    pub fn byte_offset(&self, pos: Position) -> Option<usize> {
        let start = *self.line_starts.get(pos.line)?;
        let line_text = self.line(pos.line)?;
        if pos.col == 0 {
            return Some(start);
        }
        let mut chars = line_text.char_indices().map(|(i, _)| i).skip(pos.col);
        match chars.next() {
            Some(i) => Some(start + i),
            None if line_text.chars().count() == pos.col => Some(start + line_text.len()),
            None => None,
        }
    }
}

/// Char column of a byte offset within a single line
pub fn char_col(line: &str, byte: usize) -> usize {
    line[..byte.min(line.len())].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(0, 4).to_string(), "1.4");
        assert_eq!(TextRange::on_line(2, 0, 3).to_string(), "3.0-3.3");
    }

    #[test]
    fn test_range_contains_and_overlaps() {
        let range = TextRange::on_line(0, 2, 5);
        assert!(!range.contains(Position::new(0, 1)));
        assert!(range.contains(Position::new(0, 2)));
        assert!(!range.contains(Position::new(0, 5)));
        assert!(range.overlaps(&TextRange::on_line(0, 4, 8)));
        assert!(!range.overlaps(&TextRange::on_line(0, 5, 8)));
    }

    #[test]
    fn test_line_index_positions() {
        let text = "ab\nçd\n\nx";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line(1), Some("çd"));
        assert_eq!(index.line(2), Some(""));
        assert_eq!(index.position(0), Some(Position::new(0, 0)));
        assert_eq!(index.position(3), Some(Position::new(1, 0)));
        // 'ç' is two bytes wide
        assert_eq!(index.position(5), Some(Position::new(1, 1)));
        assert_eq!(index.position(4), None);
        assert_eq!(index.position(text.len()), Some(Position::new(3, 1)));
    }

    #[test]
    fn test_line_index_byte_offset() {
        let index = LineIndex::new("ab\nçd");
        assert_eq!(index.byte_offset(Position::new(1, 1)), Some(5));
        assert_eq!(index.byte_offset(Position::new(1, 2)), Some(6));
        assert_eq!(index.byte_offset(Position::new(1, 3)), None);
        assert_eq!(index.byte_offset(Position::new(5, 0)), None);
    }

    #[test]
    fn test_selection_range_is_ordered() {
        let sel = Selection::new(Position::new(3, 1), Position::new(1, 0));
        assert_eq!(sel.range().start, Position::new(1, 0));
    }
}
