//! Tag/style store
//!
//! Owns the active theme and pushes category spans into the rendering
//! layer. Every pass clears all category tags first so no stale tag can
//! survive a structural edit.

use tracing::{trace, warn};

use crate::error::Result;
use crate::syntax::{Category, Color, Span};
use crate::text::TextRange;
use crate::theme::{BaseColors, ThemeConfig};

/// Span application primitive owned by the rendering layer
///
/// Implementations must never change buffer text. When tags overlap the
/// one applied last is the one displayed.
pub trait TagSink {
    /// Set the widget's own colors
    fn configure_base(&mut self, base: &BaseColors);

    /// Set the display color of one category tag
    fn configure_tag(&mut self, category: Category, color: Color);

    /// Remove every category tag from the whole buffer
    fn clear_all_tags(&mut self);

    /// Tag a range with a category
    fn apply_tag(&mut self, category: Category, range: TextRange) -> Result<()>;
}

/// Outcome of applying one set of spans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Active theme plus the spans last applied with it
#[derive(Debug, Clone)]
pub struct TagStore {
    theme: ThemeConfig,
    applied: Vec<Span>,
}

impl TagStore {
    pub fn new(theme: ThemeConfig) -> Self {
        Self {
            theme,
            applied: Vec::new(),
        }
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    /// Spans applied by the last pass, in application order
    pub fn applied(&self) -> &[Span] {
        &self.applied
    }

    /// Replace the color table and re-tag the existing spans
    ///
    /// The span set is reused as is; nothing is re-parsed.
    pub fn configure(&mut self, sink: &mut dyn TagSink, theme: ThemeConfig) -> ApplyReport {
        self.theme = theme;
        sink.configure_base(&self.theme.base);
        for (category, color) in self.theme.entries() {
            sink.configure_tag(category, color);
        }
        let spans = std::mem::take(&mut self.applied);
        self.apply_spans(sink, spans)
    }

    /// Clear every tag, then apply `spans` in order
    ///
    /// A span the sink rejects is logged and skipped; the rest of the pass
    /// continues.
    pub fn apply_spans(&mut self, sink: &mut dyn TagSink, spans: Vec<Span>) -> ApplyReport {
        sink.clear_all_tags();
        let mut report = ApplyReport::default();
        let mut applied = Vec::with_capacity(spans.len());
        for span in spans {
            match sink.apply_tag(span.category, span.range) {
                Ok(()) => {
                    report.applied += 1;
                    applied.push(span);
                }
                Err(e) => {
                    report.skipped += 1;
                    warn!(error = %e, category = %span.category, range = %span.range, "skipping span");
                }
            }
        }
        trace!(applied = report.applied, skipped = report.skipped, "applied spans");
        self.applied = applied;
        report
    }
}
