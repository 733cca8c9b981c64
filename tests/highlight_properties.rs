use std::time::Duration;

use pretty_assertions::assert_eq;
use pyhl::{
    Category, Config, HighlightController, HighlightMode, KeyResponse, MemoryBuffer, PassOutcome, Position,
    Selection, TextBuffer, ThemeConfig, Timer,
};

#[derive(Debug, Default)]
struct ManualTimer {
    armed: bool,
}

impl Timer for ManualTimer {
    fn arm(&mut self, _delay: Duration) {
        self.armed = true;
    }

    fn cancel(&mut self) {
        self.armed = false;
    }
}

fn controller() -> HighlightController<ManualTimer> {
    HighlightController::with_timer(ManualTimer::default()).unwrap()
}

fn highlighted(text: &str) -> (HighlightController<ManualTimer>, MemoryBuffer) {
    let mut buffer = MemoryBuffer::from_text("test.py", text);
    let mut controller = controller();
    controller.attach(&mut buffer);
    controller.on_timer(&mut buffer);
    (controller, buffer)
}

#[test]
fn repeated_pass_on_same_content_is_identical() {
    let source = "import os\n\ndef main(argv: list) -> int:\n    return len(argv)  # done\n";
    let (mut controller, mut buffer) = highlighted(source);
    let first = buffer.tags().to_vec();
    assert!(!first.is_empty());

    // Force a second full pass over the same content
    controller.scheduler_mut().invalidate();
    controller.on_modified();
    controller.on_timer(&mut buffer);
    assert_eq!(buffer.tags(), first.as_slice());
}

#[test]
fn pass_preserves_cursor_scroll_and_selection() {
    for source in ["class A:\n    pass\n", "def f(:\n    pass", "", "x = '''open\n"] {
        let mut buffer = MemoryBuffer::from_text("test.py", source);
        let selection = Some(Selection::new(Position::new(0, 1), Position::new(1, 0)));
        buffer.set_cursor(Position::new(1, 2));
        buffer.set_scroll(3);
        buffer.set_selection(selection);

        let mut controller = controller();
        controller.attach(&mut buffer);
        controller.on_timer(&mut buffer);

        assert_eq!(buffer.cursor(), Position::new(1, 2));
        assert_eq!(buffer.scroll(), 3);
        assert_eq!(buffer.selection(), selection);
    }
}

#[test]
fn invalid_syntax_falls_back_to_scanner() {
    let mut buffer = MemoryBuffer::from_text("test.py", "def f(:\n    pass");
    let mut controller = controller();
    controller.attach(&mut buffer);
    let outcome = controller.on_timer(&mut buffer);
    assert!(matches!(
        outcome,
        PassOutcome::Highlighted { mode: HighlightMode::Fallback, skipped: 0, .. }
    ));
    assert_eq!(buffer.category_at(Position::new(0, 0)), Some(Category::Keyword));
    assert_eq!(buffer.category_at(Position::new(1, 4)), Some(Category::Keyword));
}

#[test]
fn class_with_method_is_classified() {
    let (_, buffer) = highlighted("class Foo(Bar):\n    def __init__(self):\n        self.x = 1");
    let at = |line, col| buffer.category_at(Position::new(line, col));

    assert_eq!(at(0, 0), Some(Category::Keyword));
    assert_eq!(at(0, 6), Some(Category::Class));
    assert_eq!(at(0, 10), Some(Category::Class));
    assert_eq!(at(1, 8), Some(Category::Method));
    assert_eq!(at(1, 17), Some(Category::Parameter));
    assert_eq!(at(2, 8), Some(Category::SelfRef));
    assert_eq!(at(2, 13), Some(Category::Property));
    assert_eq!(at(2, 17), Some(Category::Number));
}

#[test]
fn rapid_edits_coalesce_into_one_pass() {
    let mut buffer = MemoryBuffer::from_text("test.py", "");
    let mut controller = controller();
    controller.attach(&mut buffer);

    for (col, ch) in "x = 42".chars().enumerate() {
        buffer.insert(Position::new(0, col), &ch.to_string()).unwrap();
        controller.on_modified();
    }
    assert_eq!(controller.scheduler().passes(), 0);
    assert!(controller.scheduler().timer().armed);

    let outcome = controller.on_timer(&mut buffer);
    assert!(matches!(outcome, PassOutcome::Highlighted { mode: HighlightMode::Tree, .. }));
    assert_eq!(controller.scheduler().passes(), 1);
    assert_eq!(buffer.category_at(Position::new(0, 4)), Some(Category::Number));

    assert_eq!(controller.on_timer(&mut buffer), PassOutcome::NotPending);
    assert_eq!(controller.scheduler().passes(), 1);
}

#[test]
fn theme_swap_keeps_span_set() {
    let (mut controller, mut buffer) = highlighted("@cached\ndef f(x):\n    return f\"{x}\" + b'y'\n");
    let before = buffer.tags().to_vec();
    let light_keyword = buffer.tag_color(Category::Keyword);

    let report = controller.set_theme(&mut buffer, ThemeConfig::dark());
    assert_eq!(report.applied, before.len());
    assert_eq!(buffer.tags(), before.as_slice());
    assert_ne!(buffer.tag_color(Category::Keyword), light_keyword);
    assert_eq!(buffer.tag_color(Category::Keyword), Some(ThemeConfig::dark().color(Category::Keyword)));
    assert_eq!(controller.scheduler().passes(), 1);
}

#[test]
fn open_paren_is_auto_paired() {
    let mut buffer = MemoryBuffer::from_text("test.py", "print");
    buffer.set_cursor(Position::new(0, 5));
    let mut controller = controller();

    assert_eq!(controller.on_key(&mut buffer, "("), KeyResponse::Suppress);
    assert_eq!(buffer.text(), "print()");
    assert_eq!(buffer.cursor(), Position::new(0, 6));
}

#[test]
fn newline_after_colon_adds_indent_unit() {
    let mut buffer = MemoryBuffer::from_text("test.py", "class A:\n    def f(self):");
    buffer.set_cursor(Position::new(1, 16));
    let mut controller = controller();

    assert_eq!(controller.on_key(&mut buffer, "Return"), KeyResponse::Suppress);
    assert_eq!(buffer.line_text(2).as_deref(), Some("        "));
    assert_eq!(buffer.cursor(), Position::new(2, 8));
}

#[test]
fn config_drives_assists_and_debounce() {
    let config = Config::from_str_contents("indent-width = 2\nauto-pair = no\ndebounce-ms = 200\n").unwrap();
    let mut controller = HighlightController::new(&config, ThemeConfig::light(), ManualTimer::default()).unwrap();
    assert_eq!(controller.scheduler().delay(), Duration::from_millis(200));

    let mut buffer = MemoryBuffer::from_text("test.py", "");
    assert_eq!(controller.on_key(&mut buffer, "("), KeyResponse::Default);
    assert_eq!(controller.on_key(&mut buffer, "Tab"), KeyResponse::Suppress);
    assert_eq!(buffer.text(), "  ");
}
