//! Fallback classification for buffers that do not parse
//!
//! Much less precise than the tree walk and only used while the buffer
//! is in an invalid intermediate state. Produces keyword, string,
//! number and comment spans only.
//!
//! Two passes: triple-quoted blocks are found over the whole buffer
//! first, then the parts of each line outside any block are scanned.
//! Characters inside a triple-quoted block are never re-tagged by the
//! line pass.

use super::category::Category;
use super::python::PythonTables;
use super::rules::MultilineRule;
use super::scanner::{scan, TokenKind};
use super::style::Span;
use crate::text::{char_col, LineIndex, Position, TextRange};

/// Classify source text without a syntax tree
pub fn classify_fallback(source: &str, tables: &PythonTables) -> Vec<Span> {
    let index = LineIndex::new(source);
    let blocks = triple_quoted_blocks(source, &tables.triple_quote_rules);
    let mut spans = blocks.clone();

    for line_no in 0..index.line_count() {
        let Some(line) = index.line(line_no) else {
            break;
        };
        for (from, to) in code_segments(line_no, line, &blocks) {
            let (Some(start), Some(end)) = (
                index.byte_offset(Position::new(line_no, from)),
                index.byte_offset(Position::new(line_no, to)),
            ) else {
                continue;
            };
            classify_segment(line_no, from, &source[start..end], tables, &mut spans);
        }
    }

    spans
}

/// Scanner and keyword spans for one stretch of a line
///
/// `from` is the char column where `segment` starts.
fn classify_segment(line_no: usize, from: usize, segment: &str, tables: &PythonTables, spans: &mut Vec<Span>) {
    let mut taken: Vec<TextRange> = Vec::new();
    for token in scan(line_no, segment) {
        let category = match token.kind {
            TokenKind::String => Category::String,
            TokenKind::Comment => Category::Comment,
            TokenKind::Number => Category::Number,
            TokenKind::Operator | TokenKind::Ident | TokenKind::Other => continue,
        };
        let range = TextRange::on_line(line_no, from + token.start_col, from + token.end_col);
        spans.push(Span::new(range, category));
        taken.push(range);
    }

    // Keywords are only looked for in code, never inside strings/comments
    if let Some(rule) = &tables.keyword_rule {
        for (start, end) in rule.find_all(segment) {
            let range = TextRange::on_line(line_no, from + char_col(segment, start), from + char_col(segment, end));
            if !taken.iter().any(|t| t.overlaps(&range)) {
                spans.push(Span::new(range, rule.category));
            }
        }
    }
}

/// Char column ranges of a line not covered by any block
fn code_segments(line_no: usize, line: &str, blocks: &[Span]) -> Vec<(usize, usize)> {
    let width = line.chars().count();
    let mut segments = Vec::new();
    let mut col = 0;
    for block in blocks {
        let range = block.range;
        if range.start.line > line_no || range.end.line < line_no {
            continue;
        }
        let start = if range.start.line == line_no { range.start.col } else { 0 };
        let end = if range.end.line == line_no { range.end.col } else { width };
        if start > col {
            segments.push((col, start));
        }
        col = col.max(end);
    }
    if col < width {
        segments.push((col, width));
    }
    segments
}

/// Whole-buffer pass for triple-quoted strings
///
/// At each step the earliest opening delimiter of any rule wins; an
/// unterminated block runs to the end of the buffer. A delimiter inside
/// a one-line string or a comment does not open a block.
pub fn triple_quoted_blocks(source: &str, rules: &[MultilineRule]) -> Vec<Span> {
    let index = LineIndex::new(source);
    let mut blocks = Vec::new();
    let mut pos = 0;
    loop {
        let earliest = rules
            .iter()
            .filter_map(|rule| rule.find_start(source, pos).map(|(start, end)| (start, end, rule)))
            .min_by_key(|(start, _, _)| *start);
        let Some((start, open_end, rule)) = earliest else {
            break;
        };
        if let Some(resume) = enclosing_token_end(&index, source, pos, start) {
            pos = resume;
            continue;
        }
        let end = rule.find_end(source, open_end).unwrap_or(source.len());
        if let Some(range) = index.range(start, end) {
            blocks.push(Span::new(range, rule.category));
        }
        pos = end;
    }
    blocks
}

/// Byte offset just past the string or comment token that holds `opener`
///
/// The opener's line is scanned from `pos` or from the line start,
/// whichever is later, so text closing an earlier block is not re-read.
fn enclosing_token_end(index: &LineIndex<'_>, source: &str, pos: usize, opener: usize) -> Option<usize> {
    let at = index.position(opener)?;
    let line_start = index.byte_offset(Position::new(at.line, 0))?;
    let line_end = line_start + index.line(at.line)?.len();
    let scan_start = pos.max(line_start);
    let from = index.position(scan_start)?.col;
    let segment = source.get(scan_start..line_end)?;
    let opener_col = at.col.checked_sub(from)?;

    scan(at.line, segment)
        .filter(|t| matches!(t.kind, TokenKind::String | TokenKind::Comment))
        .find(|t| t.start_col < opener_col && opener_col < t.end_col)
        .and_then(|t| index.byte_offset(Position::new(at.line, from + t.end_col)))
}
