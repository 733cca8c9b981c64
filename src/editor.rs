//! Highlight controller - the object a host editor wires up

use std::time::{Duration, Instant};

use tracing::debug;

use crate::assists::{EditAssists, KeyResponse};
use crate::buffer::TextBuffer;
use crate::config::Config;
use crate::error::Result;
use crate::scheduler::{DeadlineTimer, PassOutcome, Scheduler, Timer};
use crate::syntax::Highlighter;
use crate::tags::{ApplyReport, TagSink, TagStore};
use crate::theme::ThemeConfig;

/// Glue between a buffer's events and the highlighting core
///
/// The host forwards change notifications, timer firings, key presses
/// and theme selections; the buffer itself stays owned by the host and
/// is passed in on each call.
pub struct HighlightController<T: Timer> {
    highlighter: Highlighter,
    tags: TagStore,
    scheduler: Scheduler<T>,
    assists: EditAssists,
}

impl<T: Timer> HighlightController<T> {
    pub fn new(config: &Config, theme: ThemeConfig, timer: T) -> Result<Self> {
        Ok(Self {
            highlighter: Highlighter::new()?,
            tags: TagStore::new(theme),
            scheduler: Scheduler::new(timer, config.debounce()),
            assists: config.assists(),
        })
    }

    /// Controller with default settings and the Light theme
    pub fn with_timer(timer: T) -> Result<Self> {
        Self::new(&Config::default(), ThemeConfig::light(), timer)
    }

    /// Configure the buffer's tags and schedule the first pass
    pub fn attach<B: TagSink>(&mut self, buffer: &mut B) {
        let theme = self.tags.theme().clone();
        self.tags.configure(buffer, theme);
        self.scheduler.invalidate();
        self.scheduler.notify();
    }

    /// Buffer content changed
    pub fn on_modified(&mut self) {
        self.scheduler.notify();
    }

    /// The debounce timer fired
    pub fn on_timer<B>(&mut self, buffer: &mut B) -> PassOutcome
    where
        B: TextBuffer + TagSink,
    {
        self.scheduler.fire(buffer, &mut self.highlighter, &mut self.tags)
    }

    /// A key was pressed; returns whether default handling must be suppressed
    pub fn on_key(&mut self, buffer: &mut dyn TextBuffer, name: &str) -> KeyResponse {
        let response = self.assists.on_key(buffer, name);
        if response == KeyResponse::Suppress {
            self.scheduler.notify();
        }
        response
    }

    /// Swap the color table and re-tag without re-parsing
    pub fn set_theme<B: TagSink>(&mut self, buffer: &mut B, theme: ThemeConfig) -> ApplyReport {
        debug!(theme = %theme.name, "switching theme");
        self.tags.configure(buffer, theme)
    }

    /// Run a pass immediately, bypassing the debounce
    pub fn highlight_now<B>(&mut self, buffer: &mut B) -> PassOutcome
    where
        B: TextBuffer + TagSink,
    {
        self.scheduler.run(buffer, &mut self.highlighter, &mut self.tags)
    }

    /// Turn highlighting on or off and re-tag
    pub fn toggle<B>(&mut self, buffer: &mut B) -> PassOutcome
    where
        B: TextBuffer + TagSink,
    {
        self.highlighter.toggle();
        self.scheduler.invalidate();
        self.highlight_now(buffer)
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn scheduler(&self) -> &Scheduler<T> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<T> {
        &mut self.scheduler
    }

    pub fn assists(&self) -> &EditAssists {
        &self.assists
    }
}

impl HighlightController<DeadlineTimer> {
    /// Controller for a polling event loop
    pub fn polling(config: &Config, theme: ThemeConfig) -> Result<Self> {
        Self::new(config, theme, DeadlineTimer::new())
    }

    /// How long the event loop may block before calling [`Self::tick`]
    pub fn poll_timeout(&self, now: Instant) -> Option<Duration> {
        self.scheduler.timer().poll_timeout(now)
    }

    /// Run the pending pass if its deadline has passed
    pub fn tick<B>(&mut self, buffer: &mut B, now: Instant) -> Option<PassOutcome>
    where
        B: TextBuffer + TagSink,
    {
        if self.scheduler.timer_mut().take_due(now) {
            Some(self.on_timer(buffer))
        } else {
            None
        }
    }

    /// Fire the pending pass as if one debounce interval had elapsed
    pub fn settle<B>(&mut self, buffer: &mut B) -> Option<PassOutcome>
    where
        B: TextBuffer + TagSink,
    {
        let later = Instant::now() + self.scheduler.delay();
        self.tick(buffer, later)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::syntax::{Category, HighlightMode};
    use crate::text::Position;

    fn controller() -> HighlightController<DeadlineTimer> {
        HighlightController::polling(&Config::default(), ThemeConfig::light()).unwrap()
    }

    #[test]
    fn test_attach_configures_and_schedules() {
        let mut buffer = MemoryBuffer::from_text("t.py", "import os\n");
        let mut controller = controller();
        controller.attach(&mut buffer);
        assert!(buffer.base_colors().is_some());
        assert_eq!(
            buffer.tag_color(Category::Keyword),
            Some(ThemeConfig::light().color(Category::Keyword))
        );
        assert!(controller.poll_timeout(Instant::now()).is_some());

        let outcome = controller.settle(&mut buffer);
        assert!(matches!(
            outcome,
            Some(PassOutcome::Highlighted { mode: HighlightMode::Tree, .. })
        ));
        assert_eq!(buffer.category_at(Position::new(0, 7)), Some(Category::Namespace));
    }

    #[test]
    fn test_tick_before_deadline_does_nothing() {
        let mut buffer = MemoryBuffer::from_text("t.py", "x = 1\n");
        let mut controller = controller();
        controller.on_modified();
        assert_eq!(controller.tick(&mut buffer, Instant::now()), None);
        assert!(buffer.tags().is_empty());
    }

    #[test]
    fn test_key_assist_schedules_but_does_not_highlight() {
        let mut buffer = MemoryBuffer::from_text("t.py", "print");
        buffer.set_cursor(Position::new(0, 5));
        let mut controller = controller();
        assert_eq!(controller.on_key(&mut buffer, "parenleft"), KeyResponse::Suppress);
        assert_eq!(buffer.text(), "print()");
        assert_eq!(buffer.clear_count(), 0);
        assert!(controller.poll_timeout(Instant::now()).is_some());
    }

    #[test]
    fn test_toggle_clears_highlighting() {
        let mut buffer = MemoryBuffer::from_text("t.py", "x = 1\n");
        let mut controller = controller();
        controller.highlight_now(&mut buffer);
        assert!(!buffer.tags().is_empty());
        let outcome = controller.toggle(&mut buffer);
        assert!(matches!(
            outcome,
            PassOutcome::Highlighted { mode: HighlightMode::Disabled, applied: 0, .. }
        ));
        assert!(buffer.tags().is_empty());
    }
}
