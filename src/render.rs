//! Terminal rendering of a highlighted buffer using crossterm

use std::io::Write;

use crossterm::{
    queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::buffer::MemoryBuffer;
use crate::error::Result;
use crate::syntax::{Category, Color};

fn term_color(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Write every line of `buffer` with its resolved tag colors
///
/// Characters without a tag use the base foreground; with `background`
/// set the theme's background is painted as well.
pub fn render<W: Write>(out: &mut W, buffer: &MemoryBuffer, background: bool) -> Result<()> {
    let resolved = buffer.resolved_categories();
    let base = buffer.base_colors().copied();
    let color_of = |category: Option<Category>| -> Option<Color> {
        match category {
            Some(c) => buffer.tag_color(c).or(base.map(|b| b.foreground)),
            None => base.map(|b| b.foreground),
        }
    };

    for (line, categories) in buffer.lines().iter().zip(resolved) {
        if background {
            if let Some(base) = base {
                queue!(out, SetBackgroundColor(term_color(base.background)))?;
            }
        }

        let mut current: Option<Color> = None;
        let mut run = String::new();
        for (ch, category) in line.chars().zip(categories) {
            let color = color_of(category);
            if color != current && !run.is_empty() {
                write_run(out, current, &run)?;
                run.clear();
            }
            current = color;
            run.push(ch);
        }
        if !run.is_empty() {
            write_run(out, current, &run)?;
        }
        queue!(out, ResetColor, Print("\n"))?;
    }
    out.flush()?;
    Ok(())
}

fn write_run<W: Write>(out: &mut W, color: Option<Color>, text: &str) -> Result<()> {
    match color {
        Some(color) => queue!(out, SetForegroundColor(term_color(color)), Print(text))?,
        None => queue!(out, Print(text))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagSink;
    use crate::text::TextRange;
    use crate::theme::ThemeConfig;

    #[test]
    fn test_render_plain_buffer() {
        let buffer = MemoryBuffer::from_text("t.py", "x = 1\ny");
        let mut out = Vec::new();
        render(&mut out, &buffer, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("x = 1"));
        assert!(!text.contains("38;2;"));
    }

    #[test]
    fn test_render_colors_runs() {
        let theme = ThemeConfig::dark();
        let mut buffer = MemoryBuffer::from_text("t.py", "def f");
        buffer.configure_base(&theme.base);
        for (category, color) in theme.entries() {
            buffer.configure_tag(category, color);
        }
        buffer
            .apply_tag(Category::Keyword, TextRange::on_line(0, 0, 3))
            .unwrap();

        let mut out = Vec::new();
        render(&mut out, &buffer, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let keyword = theme.color(Category::Keyword);
        assert!(text.contains(&format!("38;2;{};{};{}m", keyword.r, keyword.g, keyword.b)));
        assert!(text.contains("def"));
        assert!(text.contains(" f"));
    }
}
