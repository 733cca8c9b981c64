//! Structural edit assists: auto-pairing, auto-indent, tab expansion
//!
//! Assists write straight into the buffer and never trigger highlighting
//! themselves; the buffer's change notification schedules the next pass.

use tracing::{trace, warn};

use crate::buffer::TextBuffer;
use crate::error::{HighlightError, Result};
use crate::text::Position;

/// Default indent unit in columns
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Keys the assists react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    /// An opening bracket or quote and its closer
    Pair(char, char),
    Newline,
    Tab,
}

impl EditKey {
    /// Map a key name to an assist key
    ///
    /// Accepts both the literal character and the X11 keysym name.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "(" | "parenleft" => EditKey::Pair('(', ')'),
            "[" | "bracketleft" => EditKey::Pair('[', ']'),
            "{" | "braceleft" => EditKey::Pair('{', '}'),
            "\"" | "quotedbl" => EditKey::Pair('"', '"'),
            "'" | "apostrophe" => EditKey::Pair('\'', '\''),
            "Return" | "Enter" | "KP_Enter" | "\n" => EditKey::Newline,
            "Tab" | "\t" => EditKey::Tab,
            _ => return None,
        };
        Some(key)
    }
}

/// Whether the host should still run its default key handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    Default,
    Suppress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditAssists {
    pub indent_width: usize,
    pub auto_pair: bool,
}

impl Default for EditAssists {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            auto_pair: true,
        }
    }
}

impl EditAssists {
    pub fn new(indent_width: usize, auto_pair: bool) -> Self {
        Self { indent_width, auto_pair }
    }

    /// Handle a key by name
    ///
    /// A failing assist is logged and the key falls through to the
    /// default handling so the keystroke is never lost.
    pub fn on_key(&self, buffer: &mut dyn TextBuffer, name: &str) -> KeyResponse {
        let Some(key) = EditKey::from_name(name) else {
            return KeyResponse::Default;
        };
        match self.apply(buffer, key) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, key = name, "edit assist failed");
                KeyResponse::Default
            }
        }
    }

    pub fn apply(&self, buffer: &mut dyn TextBuffer, key: EditKey) -> Result<KeyResponse> {
        match key {
            EditKey::Pair(open, close) => {
                if !self.auto_pair {
                    return Ok(KeyResponse::Default);
                }
                self.auto_pair(buffer, open, close)?;
            }
            EditKey::Newline => self.newline_and_indent(buffer)?,
            EditKey::Tab => self.insert_tab(buffer)?,
        }
        Ok(KeyResponse::Suppress)
    }

    /// Insert `open` and `close` and put the cursor between them
    pub fn auto_pair(&self, buffer: &mut dyn TextBuffer, open: char, close: char) -> Result<()> {
        let cursor = buffer.cursor();
        let pair: String = [open, close].iter().collect();
        buffer.insert(cursor, &pair)?;
        buffer.set_cursor(cursor.offset_cols(1));
        trace!(%cursor, pair = %pair, "auto-paired");
        Ok(())
    }

    /// Insert a newline carrying the current indent, one unit deeper after `:`
    pub fn newline_and_indent(&self, buffer: &mut dyn TextBuffer) -> Result<()> {
        let cursor = buffer.cursor();
        let line = buffer
            .line_text(cursor.line)
            .ok_or(HighlightError::OutOfRange(cursor))?;
        let before: String = line.chars().take(cursor.col).collect();

        let mut indent = leading_whitespace(&before).to_string();
        if before.trim_end().ends_with(':') {
            indent.push_str(&" ".repeat(self.indent_width));
        }

        buffer.insert(cursor, &format!("\n{indent}"))?;
        buffer.set_cursor(Position::new(cursor.line + 1, indent.chars().count()));
        Ok(())
    }

    /// Insert one indent unit of spaces
    pub fn insert_tab(&self, buffer: &mut dyn TextBuffer) -> Result<()> {
        let cursor = buffer.cursor();
        buffer.insert(cursor, &" ".repeat(self.indent_width))?;
        buffer.set_cursor(cursor.offset_cols(self.indent_width));
        Ok(())
    }
}

/// Leading spaces and tabs, verbatim
fn leading_whitespace(text: &str) -> &str {
    let end = text.find(|c: char| c != ' ' && c != '\t').unwrap_or(text.len());
    &text[..end]
}
