//! pyhl - incremental, AST-aware Python syntax highlighting for editor widgets
//!
//! The host owns the text buffer and forwards change notifications, key
//! presses and theme selections to a [`HighlightController`]. Passes are
//! debounced; each pass parses the whole buffer, classifies the syntax
//! tree into category spans and re-applies them as tags. While the
//! buffer does not parse a line scanner keeps basic highlighting alive.

pub mod assists;
pub mod buffer;
pub mod config;
pub mod editor;
pub mod error;
pub mod render;
pub mod scheduler;
pub mod syntax;
pub mod tags;
pub mod text;
pub mod theme;

pub use assists::{EditAssists, EditKey, KeyResponse};
pub use buffer::{MemoryBuffer, TextBuffer};
pub use config::Config;
pub use editor::HighlightController;
pub use error::{HighlightError, ParseError, Result};
pub use scheduler::{DeadlineTimer, HighlightSession, PassOutcome, Scheduler, SchedulerState, Timer};
pub use syntax::{Category, Color, HighlightMode, Highlighter, Span};
pub use tags::{ApplyReport, TagSink, TagStore};
pub use text::{Position, Selection, TextRange};
pub use theme::{BaseColors, ThemeConfig, ThemeRegistry};
