//! Incremental re-highlight scheduling
//!
//! Buffer changes are debounced on the trailing edge: every change
//! re-arms a single timer, and only when the timer fires does a pass run
//! against whatever the buffer holds at that moment.
//!
//! ```text
//!   Idle --notify--> Pending --notify--> Pending (timer re-armed)
//!                       |
//!                     fire --> Idle (pass ran, or skipped if unchanged)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{debug, error, trace};

use crate::buffer::TextBuffer;
use crate::error::{HighlightError, Result};
use crate::syntax::{HighlightMode, Highlighter};
use crate::tags::{TagSink, TagStore};
use crate::text::{Position, Selection};

/// Default debounce interval
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// A one-shot timer provided by the host event loop
pub trait Timer {
    /// Schedule a single firing after `delay`, replacing any earlier one
    fn arm(&mut self, delay: Duration);

    /// Drop the scheduled firing, if any
    fn cancel(&mut self);
}

/// A timer for polling event loops
///
/// The loop asks [`DeadlineTimer::poll_timeout`] how long it may block
/// and calls [`DeadlineTimer::take_due`] when it wakes up.
#[derive(Debug, Clone, Default)]
pub struct DeadlineTimer {
    deadline: Option<Instant>,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Time left until the deadline; `None` when not armed
    pub fn poll_timeout(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Disarm and return true if the deadline has passed
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

impl Timer for DeadlineTimer {
    fn arm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// A change arrived and the timer is armed
    Pending,
}

/// View state saved across one highlight pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSession {
    pub cursor: Position,
    pub scroll: usize,
    pub selection: Option<Selection>,
}

impl HighlightSession {
    pub fn capture(buffer: &dyn TextBuffer) -> Self {
        Self {
            cursor: buffer.cursor(),
            scroll: buffer.scroll(),
            selection: buffer.selection(),
        }
    }

    pub fn restore(self, buffer: &mut dyn TextBuffer) {
        buffer.set_cursor(self.cursor);
        buffer.set_scroll(self.scroll);
        buffer.set_selection(self.selection);
    }
}

/// What a timer firing did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Nothing was pending
    NotPending,
    /// Content equals the last highlighted content
    Unchanged,
    Highlighted {
        mode: HighlightMode,
        applied: usize,
        skipped: usize,
    },
    /// The pass failed; the next change retries
    Failed,
}

/// Trailing-edge debouncer driving highlight passes
#[derive(Debug)]
pub struct Scheduler<T: Timer> {
    timer: T,
    delay: Duration,
    state: SchedulerState,
    last_text: Option<String>,
    passes: usize,
}

impl<T: Timer> Scheduler<T> {
    pub fn new(timer: T, delay: Duration) -> Self {
        Self {
            timer,
            delay,
            state: SchedulerState::Idle,
            last_text: None,
            passes: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Number of passes that actually ran
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Record a buffer change and (re)arm the timer
    pub fn notify(&mut self) {
        self.timer.cancel();
        self.timer.arm(self.delay);
        self.state = SchedulerState::Pending;
        trace!(delay_ms = self.delay.as_millis() as u64, "highlight scheduled");
    }

    /// Forget the last highlighted content so the next pass always runs
    pub fn invalidate(&mut self) {
        self.last_text = None;
    }

    /// Timer callback
    pub fn fire<B>(&mut self, buffer: &mut B, highlighter: &mut Highlighter, tags: &mut TagStore) -> PassOutcome
    where
        B: TextBuffer + TagSink,
    {
        if self.state != SchedulerState::Pending {
            return PassOutcome::NotPending;
        }
        self.state = SchedulerState::Idle;
        self.run(buffer, highlighter, tags)
    }

    /// Run a pass now unless the content is unchanged
    pub fn run<B>(&mut self, buffer: &mut B, highlighter: &mut Highlighter, tags: &mut TagStore) -> PassOutcome
    where
        B: TextBuffer + TagSink,
    {
        let text = buffer.text();
        if self.last_text.as_deref() == Some(text.as_str()) {
            trace!("buffer unchanged, skipping highlight");
            return PassOutcome::Unchanged;
        }

        match highlight_pass(buffer, highlighter, tags, &text) {
            Ok(outcome) => {
                self.passes += 1;
                self.last_text = Some(text);
                outcome
            }
            Err(e) => {
                error!(error = %e, "highlight pass failed");
                PassOutcome::Failed
            }
        }
    }
}

/// One pass: snapshot view state, re-tag, restore
fn highlight_pass<B>(buffer: &mut B, highlighter: &mut Highlighter, tags: &mut TagStore, text: &str) -> Result<PassOutcome>
where
    B: TextBuffer + TagSink,
{
    let session = HighlightSession::capture(&*buffer);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let highlights = highlighter.highlight(text);
        let report = tags.apply_spans(&mut *buffer, highlights.spans);
        (highlights.mode, report)
    }));
    session.restore(&mut *buffer);

    let (mode, report) = result.map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        HighlightError::Message(format!("highlight pass panicked: {reason}"))
    })?;

    debug!(?mode, applied = report.applied, skipped = report.skipped, "highlight pass done");
    Ok(PassOutcome::Highlighted {
        mode,
        applied: report.applied,
        skipped: report.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::syntax::{Category, Color};
    use crate::text::TextRange;
    use crate::theme::{BaseColors, ThemeConfig};

    #[derive(Debug, Default)]
    struct ManualTimer {
        armed: Option<Duration>,
        arms: usize,
        cancels: usize,
    }

    impl Timer for ManualTimer {
        fn arm(&mut self, delay: Duration) {
            self.armed = Some(delay);
            self.arms += 1;
        }

        fn cancel(&mut self) {
            self.armed = None;
            self.cancels += 1;
        }
    }

    fn setup(text: &str) -> (Scheduler<ManualTimer>, MemoryBuffer, Highlighter, TagStore) {
        (
            Scheduler::new(ManualTimer::default(), Duration::from_millis(DEFAULT_DEBOUNCE_MS)),
            MemoryBuffer::from_text("t.py", text),
            Highlighter::new().unwrap(),
            TagStore::new(ThemeConfig::light()),
        )
    }

    /// Buffer whose tag layer blows up once, moving the view as it goes
    struct FlakyBuffer {
        inner: MemoryBuffer,
        fail_next: bool,
    }

    impl TextBuffer for FlakyBuffer {
        fn text(&self) -> String {
            self.inner.text()
        }

        fn insert(&mut self, pos: Position, text: &str) -> Result<()> {
            self.inner.insert(pos, text)
        }

        fn cursor(&self) -> Position {
            self.inner.cursor()
        }

        fn set_cursor(&mut self, pos: Position) {
            self.inner.set_cursor(pos);
        }

        fn scroll(&self) -> usize {
            self.inner.scroll()
        }

        fn set_scroll(&mut self, offset: usize) {
            self.inner.set_scroll(offset);
        }

        fn selection(&self) -> Option<Selection> {
            self.inner.selection()
        }

        fn set_selection(&mut self, selection: Option<Selection>) {
            self.inner.set_selection(selection);
        }
    }

    impl TagSink for FlakyBuffer {
        fn configure_base(&mut self, base: &BaseColors) {
            self.inner.configure_base(base);
        }

        fn configure_tag(&mut self, category: Category, color: Color) {
            self.inner.configure_tag(category, color);
        }

        fn clear_all_tags(&mut self) {
            self.inner.clear_all_tags();
        }

        fn apply_tag(&mut self, category: Category, range: TextRange) -> Result<()> {
            if self.fail_next {
                self.fail_next = false;
                self.inner.set_cursor(Position::default());
                self.inner.set_scroll(0);
                self.inner.set_selection(None);
                panic!("tag layer detached");
            }
            self.inner.apply_tag(category, range)
        }
    }

    #[test]
    fn test_notify_rearms_timer() {
        let (mut scheduler, ..) = setup("");
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        scheduler.notify();
        scheduler.notify();
        scheduler.notify();
        assert_eq!(scheduler.state(), SchedulerState::Pending);
        assert_eq!(scheduler.timer().arms, 3);
        assert_eq!(scheduler.timer().cancels, 3);
        assert_eq!(scheduler.timer().armed, Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_fire_without_pending_change() {
        let (mut scheduler, mut buffer, mut highlighter, mut tags) = setup("x = 1");
        assert_eq!(scheduler.fire(&mut buffer, &mut highlighter, &mut tags), PassOutcome::NotPending);
        assert_eq!(scheduler.passes(), 0);
    }

    #[test]
    fn test_unchanged_content_is_skipped() {
        let (mut scheduler, mut buffer, mut highlighter, mut tags) = setup("x = 1");
        scheduler.notify();
        assert!(matches!(
            scheduler.fire(&mut buffer, &mut highlighter, &mut tags),
            PassOutcome::Highlighted { mode: HighlightMode::Tree, .. }
        ));
        scheduler.notify();
        assert_eq!(scheduler.fire(&mut buffer, &mut highlighter, &mut tags), PassOutcome::Unchanged);
        assert_eq!(scheduler.passes(), 1);
        assert_eq!(buffer.clear_count(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_invalidate_forces_pass() {
        let (mut scheduler, mut buffer, mut highlighter, mut tags) = setup("x = 1");
        scheduler.notify();
        scheduler.fire(&mut buffer, &mut highlighter, &mut tags);
        scheduler.invalidate();
        scheduler.notify();
        assert!(matches!(
            scheduler.fire(&mut buffer, &mut highlighter, &mut tags),
            PassOutcome::Highlighted { .. }
        ));
        assert_eq!(scheduler.passes(), 2);
    }

    #[test]
    fn test_pass_preserves_view_state() {
        let (mut scheduler, mut buffer, mut highlighter, mut tags) = setup("def f(a):\n    return a\n");
        let selection = Some(Selection::new(Position::new(0, 4), Position::new(1, 2)));
        buffer.set_cursor(Position::new(1, 5));
        buffer.set_scroll(1);
        buffer.set_selection(selection);

        scheduler.notify();
        scheduler.fire(&mut buffer, &mut highlighter, &mut tags);

        assert_eq!(buffer.cursor(), Position::new(1, 5));
        assert_eq!(buffer.scroll(), 1);
        assert_eq!(buffer.selection(), selection);
    }

    #[test]
    fn test_failed_pass_restores_view_and_retries() {
        let (mut scheduler, inner, mut highlighter, mut tags) = setup("def f(a):\n    return a\n");
        let mut buffer = FlakyBuffer { inner, fail_next: true };
        let selection = Some(Selection::new(Position::new(0, 4), Position::new(1, 2)));
        buffer.set_cursor(Position::new(1, 5));
        buffer.set_scroll(1);
        buffer.set_selection(selection);

        scheduler.notify();
        assert_eq!(scheduler.fire(&mut buffer, &mut highlighter, &mut tags), PassOutcome::Failed);
        assert_eq!(scheduler.passes(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(buffer.cursor(), Position::new(1, 5));
        assert_eq!(buffer.scroll(), 1);
        assert_eq!(buffer.selection(), selection);

        // The failed pass did not record the content, so the same text runs again
        scheduler.notify();
        assert!(matches!(
            scheduler.fire(&mut buffer, &mut highlighter, &mut tags),
            PassOutcome::Highlighted { mode: HighlightMode::Tree, skipped: 0, .. }
        ));
        assert_eq!(scheduler.passes(), 1);
        assert!(!buffer.inner.tags().is_empty());
        assert_eq!(buffer.cursor(), Position::new(1, 5));
    }

    #[test]
    fn test_deadline_timer() {
        let mut timer = DeadlineTimer::new();
        let now = Instant::now();
        assert_eq!(timer.poll_timeout(now), None);
        assert!(!timer.take_due(now));

        timer.arm(Duration::from_secs(3600));
        assert!(timer.is_armed());
        assert!(!timer.take_due(Instant::now()));
        assert!(timer.poll_timeout(Instant::now()).is_some_and(|d| d <= Duration::from_secs(3600)));

        timer.arm(Duration::ZERO);
        let later = Instant::now() + Duration::from_millis(1);
        assert_eq!(timer.poll_timeout(later), Some(Duration::ZERO));
        assert!(timer.take_due(later));
        assert!(!timer.is_armed());

        timer.arm(Duration::from_secs(1));
        timer.cancel();
        assert!(!timer.is_armed());
    }
}
