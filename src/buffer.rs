//! Buffer collaborator interface and an in-memory implementation

use std::path::{Path, PathBuf};

use crate::error::{HighlightError, Result};
use crate::syntax::{Category, Color};
use crate::tags::TagSink;
use crate::text::{LineIndex, Position, Selection, TextRange};
use crate::theme::BaseColors;

/// The text widget the highlighter and edit assists work on
///
/// The core never owns buffer storage; it reads and writes through this
/// trait only.
pub trait TextBuffer {
    /// Whole buffer contents, lines joined with `\n`
    fn text(&self) -> String;

    /// One line without its terminator
    fn line_text(&self, line: usize) -> Option<String> {
        self.text().split('\n').nth(line).map(str::to_string)
    }

    /// Insert text at a position; `\n` splits lines
    fn insert(&mut self, pos: Position, text: &str) -> Result<()>;

    fn cursor(&self) -> Position;
    fn set_cursor(&mut self, pos: Position);

    /// First visible line
    fn scroll(&self) -> usize;
    fn set_scroll(&mut self, offset: usize);

    fn selection(&self) -> Option<Selection>;
    fn set_selection(&mut self, selection: Option<Selection>);
}

/// A buffer held in memory, with its own tag layer
///
/// Used by the demo binary and by tests; a GUI host would implement
/// [`TextBuffer`] and [`TagSink`] on its widget instead.
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    /// Lines of text, never empty
    lines: Vec<String>,
    /// Buffer name (file name or "*scratch*")
    name: String,
    filename: Option<PathBuf>,
    modified: bool,
    cursor: Position,
    scroll: usize,
    selection: Option<Selection>,
    tags: Vec<(Category, TextRange)>,
    tag_colors: [Option<Color>; Category::COUNT],
    base: Option<BaseColors>,
    clears: usize,
}

impl MemoryBuffer {
    /// Create a new empty buffer with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lines: vec![String::new()],
            name: name.into(),
            filename: None,
            modified: false,
            cursor: Position::default(),
            scroll: 0,
            selection: None,
            tags: Vec::new(),
            tag_colors: [None; Category::COUNT],
            base: None,
            clears: 0,
        }
    }

    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let mut buffer = Self::new(name);
        buffer.lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        buffer
    }

    /// Create a buffer from file contents
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let mut buffer = Self::from_text(name, &content);
        buffer.filename = Some(path.to_path_buf());
        Ok(buffer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Tags currently applied, in application order
    pub fn tags(&self) -> &[(Category, TextRange)] {
        &self.tags
    }

    /// How many times the tag layer has been cleared
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn tag_color(&self, category: Category) -> Option<Color> {
        self.tag_colors[category.index()]
    }

    pub fn base_colors(&self) -> Option<&BaseColors> {
        self.base.as_ref()
    }

    /// The category displayed at a position: the last applied tag covering it
    pub fn category_at(&self, pos: Position) -> Option<Category> {
        self.tags
            .iter()
            .rev()
            .find(|(_, range)| range.contains(pos))
            .map(|(category, _)| *category)
    }

    /// Displayed category of every character, line by line
    pub fn resolved_categories(&self) -> Vec<Vec<Option<Category>>> {
        let mut resolved: Vec<Vec<Option<Category>>> =
            self.lines.iter().map(|l| vec![None; l.chars().count()]).collect();
        for (category, range) in &self.tags {
            for line in range.start.line..=range.end.line {
                let Some(cells) = resolved.get_mut(line) else {
                    break;
                };
                let start = if line == range.start.line { range.start.col } else { 0 };
                let end = if line == range.end.line {
                    range.end.col.min(cells.len())
                } else {
                    cells.len()
                };
                for cell in cells.iter_mut().take(end).skip(start) {
                    *cell = Some(*category);
                }
            }
        }
        resolved
    }

    fn char_len(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|l| l.chars().count())
    }

    fn is_valid(&self, pos: Position) -> bool {
        self.char_len(pos.line).is_some_and(|len| pos.col <= len)
    }
}

impl Default for MemoryBuffer {
    fn default() -> Self {
        Self::new("*scratch*")
    }
}

impl TextBuffer for MemoryBuffer {
    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn line_text(&self, line: usize) -> Option<String> {
        self.lines.get(line).cloned()
    }

    fn insert(&mut self, pos: Position, text: &str) -> Result<()> {
        let line = self.lines.get_mut(pos.line).ok_or(HighlightError::OutOfRange(pos))?;
        let byte = LineIndex::new(line)
            .byte_offset(Position::new(0, pos.col))
            .ok_or(HighlightError::OutOfRange(pos))?;

        let tail = line.split_off(byte);
        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            line.push_str(first);
        }
        let mut at = pos.line;
        for piece in pieces {
            at += 1;
            self.lines.insert(at, piece.to_string());
        }
        self.lines[at].push_str(&tail);
        self.modified = true;
        Ok(())
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
    }

    fn scroll(&self) -> usize {
        self.scroll
    }

    fn set_scroll(&mut self, offset: usize) {
        self.scroll = offset;
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }
}

impl TagSink for MemoryBuffer {
    fn configure_base(&mut self, base: &BaseColors) {
        self.base = Some(*base);
    }

    fn configure_tag(&mut self, category: Category, color: Color) {
        self.tag_colors[category.index()] = Some(color);
    }

    fn clear_all_tags(&mut self) {
        self.tags.clear();
        self.clears += 1;
    }

    fn apply_tag(&mut self, category: Category, range: TextRange) -> Result<()> {
        let reason = if range.end < range.start {
            Some("range ends before it starts")
        } else if !self.is_valid(range.start) || !self.is_valid(range.end) {
            Some("range is outside the buffer")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(HighlightError::TagApplication {
                category,
                range,
                reason: reason.to_string(),
            });
        }
        self.tags.push((category, range));
        Ok(())
    }
}
