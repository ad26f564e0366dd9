//! Text addressing: conversions between line/column positions, absolute
//! offsets and spans, plus the grapheme and indentation helpers the motion
//! and operator layers share.
//!
//! Offsets count grapheme clusters from the start of the buffer, with every
//! line break counting as one unit.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Result, VimError};
use crate::traits::{Settings, TextBuffer};
use crate::types::{Position, Range, Shape, Span};

/// Number of addressable lines. An empty buffer still has one empty line.
pub fn line_total<B: TextBuffer + ?Sized>(buf: &B) -> u32 {
    buf.line_count().max(1)
}

pub fn graphemes(s: &str) -> Vec<&str> {
    s.graphemes(true).collect()
}

pub fn grapheme_at(s: &str, col: u32) -> Option<&str> {
    s.graphemes(true).nth(col as usize)
}

/// Byte index of grapheme column `col` in `s`, clamped to the end of `s`.
pub fn byte_index(s: &str, col: u32) -> usize {
    s.grapheme_indices(true)
        .nth(col as usize)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Fails with `OutOfRange` unless `pos` addresses an existing line and a
/// column no further than one past its last character.
pub fn validate<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Result<()> {
    if pos.line >= line_total(buf) || pos.col > buf.line_len(pos.line) {
        return Err(VimError::OutOfRange {
            line: pos.line,
            col: pos.col,
        });
    }
    Ok(())
}

/// Validates an edit range. The end may sit at `(line_count, 0)`, just past
/// the final line break.
pub fn validate_range<B: TextBuffer + ?Sized>(buf: &B, range: Range) -> Result<()> {
    validate(buf, range.start)?;
    if range.end.col == 0 && range.end.line == line_total(buf) {
        return Ok(());
    }
    validate(buf, range.end)?;
    if range.end < range.start {
        return Err(VimError::OutOfRange {
            line: range.end.line,
            col: range.end.col,
        });
    }
    Ok(())
}

/// Clamps into Normal-mode bounds: the caret rests on a character, never
/// past the last one.
pub fn clamp_normal<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Position {
    let line = pos.line.min(buf.last_line());
    let len = buf.line_len(line);
    Position {
        line,
        col: pos.col.min(len.saturating_sub(1)),
    }
}

pub fn end_of_buffer<B: TextBuffer + ?Sized>(buf: &B) -> Position {
    let line = buf.last_line();
    Position::new(line, buf.line_len(line))
}

/// Column of the first non-blank character of `line`. An all-blank line
/// yields its last column.
pub fn first_non_blank<B: TextBuffer + ?Sized>(buf: &B, line: u32) -> Position {
    let text = buf.line(line);
    let mut len = 0;
    for (col, g) in text.graphemes(true).enumerate() {
        if !is_blank(g) {
            return Position::new(line, col as u32);
        }
        len = col as u32 + 1;
    }
    Position::new(line, len.saturating_sub(1))
}

pub fn is_blank(g: &str) -> bool {
    g.chars().all(|c| c == ' ' || c == '\t')
}

/// Span covering whole lines `first..=last`, excluding the final line break.
pub fn line_span<B: TextBuffer + ?Sized>(buf: &B, first: u32, last: u32) -> Result<Span> {
    let (first, last) = (first.min(last), first.max(last));
    if last >= line_total(buf) {
        return Err(VimError::OutOfRange { line: last, col: 0 });
    }
    Ok(Span {
        start: Position::new(first, 0),
        end: Position::new(last, buf.line_len(last)),
        shape: Shape::Line,
    })
}

/// Raw range covering lines `first..=last` together with a line break, so
/// that deleting it removes the lines entirely.
///
/// The final buffer line has no break of its own; in that case the break
/// before `first` is taken instead. A span covering the whole buffer has no
/// break to take and ends at the end of `last`.
pub fn line_span_including_line_break<B: TextBuffer + ?Sized>(
    buf: &B,
    first: u32,
    last: u32,
) -> Result<Range> {
    let span = line_span(buf, first, last)?;
    let (first, last) = (span.first_line(), span.end.line);
    if last + 1 < line_total(buf) {
        Ok(Range::new(Position::new(first, 0), Position::new(last + 1, 0)))
    } else if first > 0 {
        Ok(Range::new(
            Position::new(first - 1, buf.line_len(first - 1)),
            span.end,
        ))
    } else {
        Ok(Range::new(span.start, span.end))
    }
}

pub fn position_to_offset<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Result<usize> {
    validate(buf, pos)?;
    let before: usize = (0..pos.line).map(|l| buf.line_len(l) as usize + 1).sum();
    Ok(before + pos.col as usize)
}

pub fn offset_to_position<B: TextBuffer + ?Sized>(buf: &B, offset: usize) -> Result<Position> {
    let mut remaining = offset;
    for line in 0..line_total(buf) {
        let len = buf.line_len(line) as usize;
        if remaining <= len {
            return Ok(Position::new(line, remaining as u32));
        }
        remaining -= len + 1;
    }
    Err(VimError::OutOfRange {
        line: line_total(buf),
        col: 0,
    })
}

/// The text of a raw range, with `\n` between lines.
pub fn slice<B: TextBuffer + ?Sized>(buf: &B, range: Range) -> String {
    let mut out = String::new();
    let total = line_total(buf);
    let mut line = range.start.line;
    while line <= range.end.line && line < total {
        let text = buf.line(line);
        let from = if line == range.start.line {
            byte_index(&text, range.start.col)
        } else {
            0
        };
        if line == range.end.line {
            let to = byte_index(&text, range.end.col).max(from);
            out.push_str(&text[from..to]);
            break;
        }
        out.push_str(&text[from..]);
        out.push('\n');
        line += 1;
    }
    out
}

/// Where the caret lands after `inserted` is typed at `at`.
pub fn advance(at: Position, inserted: &str) -> Position {
    match inserted.rsplit_once('\n') {
        Some((head, tail)) => Position::new(
            at.line + head.matches('\n').count() as u32 + 1,
            tail.graphemes(true).count() as u32,
        ),
        None => Position::new(at.line, at.col + inserted.graphemes(true).count() as u32),
    }
}

/// The `[left, right)` columns of a block span on one line, clipped to the
/// line's length.
pub fn block_columns<B: TextBuffer + ?Sized>(buf: &B, line: u32, span: &Span) -> (u32, u32) {
    let len = buf.line_len(line);
    (span.start.col.min(len), span.end.col.min(len))
}

/// The leading whitespace of `line` as (grapheme count, display width).
pub fn leading_whitespace(line: &str, tab_stop: u32) -> (u32, u32) {
    let tab_stop = tab_stop.max(1);
    let mut count = 0;
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += tab_stop - width % tab_stop,
            _ => break,
        }
        count += 1;
    }
    (count, width)
}

/// Whitespace producing `width` columns of indent under the given settings.
pub fn build_indent<S: Settings + ?Sized>(width: u32, settings: &S) -> String {
    if settings.expand_tab() {
        return " ".repeat(width as usize);
    }
    let tab_stop = settings.tab_stop().max(1);
    let mut indent = "\t".repeat((width / tab_stop) as usize);
    indent.push_str(&" ".repeat((width % tab_stop) as usize));
    indent
}
