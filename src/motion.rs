//! Motion resolution: from a starting position, a motion and a count, find
//! the target position and the shape of the span between them.

use serde::{Deserialize, Serialize};

use crate::text::{self, graphemes, line_total};
use crate::traits::TextBuffer;
use crate::types::{Position, Shape, Span};

/// A single-character search on the current line (`f F t T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindSpec {
    pub ch: char,
    pub forward: bool,
    /// Stop one short of the character (`t`/`T`).
    pub till: bool,
}

impl FindSpec {
    pub fn reversed(self) -> Self {
        Self {
            forward: !self.forward,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// `0`
    LineStart,
    /// `^`
    FirstNonBlank,
    /// `$`
    LineEnd,
    /// `w` / `W`
    WordForward { big: bool },
    /// `b` / `B`
    WordBackward { big: bool },
    /// `e` / `E`
    WordEnd { big: bool },
    /// `gg`
    FirstLine,
    /// `G`
    LastLine,
    /// `+` and Enter
    NextLine,
    /// `-`
    PrevLine,
    /// `_`
    CurrentLine,
    /// `}`
    ParagraphForward,
    /// `{`
    ParagraphBackward,
    FindChar(FindSpec),
    /// `;` and `,`
    RepeatFind { reverse: bool },
    /// `%`
    MatchPair,
}

impl Motion {
    /// Vertical motions keep the preferred column.
    pub fn keeps_column(&self) -> bool {
        matches!(self, Motion::Up | Motion::Down)
    }
}

/// Where a motion lands and how the span up to it is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionResult {
    pub target: Position,
    /// `Character` or `Line`.
    pub shape: Shape,
    /// Whether the target character belongs to the span.
    pub inclusive: bool,
}

/// State a motion may depend on besides the buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionContext {
    /// An operator is waiting for this motion.
    pub operator_pending: bool,
    /// The pending operator is change; `cw` then behaves like `ce`.
    pub change: bool,
    /// Column `j`/`k` try to return to.
    pub preferred_col: Option<u32>,
    /// The last `f F t T` search, for `;` and `,`.
    pub last_find: Option<FindSpec>,
}

impl MotionResult {
    fn exclusive(target: Position) -> Self {
        Self {
            target,
            shape: Shape::Character,
            inclusive: false,
        }
    }

    fn inclusive(target: Position) -> Self {
        Self {
            target,
            shape: Shape::Character,
            inclusive: true,
        }
    }

    fn linewise(target: Position) -> Self {
        Self {
            target,
            shape: Shape::Line,
            inclusive: true,
        }
    }

    /// The span an operator acts on when this motion starts at `from`.
    pub fn span<B: TextBuffer + ?Sized>(&self, buf: &B, from: Position) -> Span {
        let (start, end) = if from <= self.target {
            (from, self.target)
        } else {
            (self.target, from)
        };
        if self.shape == Shape::Line {
            return Span {
                start: Position::new(start.line, 0),
                end: Position::new(end.line, buf.line_len(end.line)),
                shape: Shape::Line,
            };
        }
        if self.inclusive {
            return Span {
                start,
                end: step_past(buf, end),
                shape: Shape::Character,
            };
        }
        // An exclusive motion ending in column 0 of a later line stops at the
        // end of the previous line, and turns line-wise when it started at or
        // before the first non-blank.
        if end.col == 0 && end.line > start.line {
            let last = end.line - 1;
            if start.col <= text::first_non_blank(buf, start.line).col {
                return Span {
                    start: Position::new(start.line, 0),
                    end: Position::new(last, buf.line_len(last)),
                    shape: Shape::Line,
                };
            }
            return Span {
                start,
                end: Position::new(last, buf.line_len(last)),
                shape: Shape::Character,
            };
        }
        Span {
            start,
            end,
            shape: Shape::Character,
        }
    }
}

/// The position just past `pos`: the next column, or the start of the next
/// line when `pos` sits at or beyond the end of its line.
pub fn step_past<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Position {
    let len = buf.line_len(pos.line);
    if pos.col < len {
        Position::new(pos.line, pos.col + 1)
    } else if pos.line + 1 < line_total(buf) {
        Position::new(pos.line + 1, 0)
    } else {
        Position::new(pos.line, len)
    }
}

/// Resolves `motion` from `from`. `count` is `None` when no count was typed;
/// most motions treat that as 1, `G` and `gg` as "no line number".
///
/// Returns `None` when the motion cannot succeed at all (no character found,
/// no matching bracket). Motions running past the buffer clamp instead.
pub fn resolve<B: TextBuffer + ?Sized>(
    buf: &B,
    from: Position,
    motion: Motion,
    count: Option<u32>,
    ctx: &MotionContext,
) -> Option<MotionResult> {
    let from = buf.clamp(from);
    let n = count.unwrap_or(1).max(1);
    let last = buf.last_line();
    let result = match motion {
        Motion::Left => MotionResult::exclusive(Position::new(from.line, from.col.saturating_sub(n))),
        Motion::Right => {
            let len = buf.line_len(from.line);
            MotionResult::exclusive(Position::new(from.line, from.col.saturating_add(n).min(len)))
        }
        Motion::Up => {
            let line = from.line.saturating_sub(n);
            MotionResult::linewise(vertical_target(buf, line, from, ctx))
        }
        Motion::Down => {
            let line = from.line.saturating_add(n).min(last);
            MotionResult::linewise(vertical_target(buf, line, from, ctx))
        }
        Motion::LineStart => MotionResult::exclusive(Position::new(from.line, 0)),
        Motion::FirstNonBlank => MotionResult::exclusive(text::first_non_blank(buf, from.line)),
        Motion::LineEnd => {
            let line = from.line.saturating_add(n - 1).min(last);
            let len = buf.line_len(line);
            if len == 0 {
                MotionResult::exclusive(Position::new(line, 0))
            } else {
                MotionResult::inclusive(Position::new(line, len - 1))
            }
        }
        Motion::WordForward { big } => word_forward(buf, from, n, big, ctx),
        Motion::WordBackward { big } => {
            let mut pos = from;
            for _ in 0..n {
                pos = word_backward_step(buf, pos, big);
            }
            MotionResult::exclusive(pos)
        }
        Motion::WordEnd { big } => {
            let mut pos = from;
            for _ in 0..n {
                pos = word_end_step(buf, pos, big);
            }
            MotionResult::inclusive(pos)
        }
        Motion::FirstLine => {
            let line = count.map(|c| c.max(1) - 1).unwrap_or(0).min(last);
            MotionResult::linewise(text::first_non_blank(buf, line))
        }
        Motion::LastLine => {
            let line = count.map(|c| c.max(1) - 1).unwrap_or(last).min(last);
            MotionResult::linewise(text::first_non_blank(buf, line))
        }
        Motion::NextLine => {
            let line = from.line.saturating_add(n).min(last);
            MotionResult::linewise(text::first_non_blank(buf, line))
        }
        Motion::PrevLine => {
            let line = from.line.saturating_sub(n);
            MotionResult::linewise(text::first_non_blank(buf, line))
        }
        Motion::CurrentLine => {
            let line = from.line.saturating_add(n - 1).min(last);
            MotionResult::linewise(text::first_non_blank(buf, line))
        }
        Motion::ParagraphForward => MotionResult::exclusive(paragraph_forward(buf, from, n)),
        Motion::ParagraphBackward => MotionResult::exclusive(paragraph_backward(buf, from, n)),
        Motion::FindChar(spec) => find_char(buf, from, spec, n, false)?,
        Motion::RepeatFind { reverse } => {
            let spec = ctx.last_find?;
            let spec = if reverse { spec.reversed() } else { spec };
            find_char(buf, from, spec, n, true)?
        }
        Motion::MatchPair => MotionResult::inclusive(match_pair(buf, from)?),
    };
    Some(result)
}

fn vertical_target<B: TextBuffer + ?Sized>(
    buf: &B,
    line: u32,
    from: Position,
    ctx: &MotionContext,
) -> Position {
    let want = ctx.preferred_col.unwrap_or(from.col);
    let len = buf.line_len(line);
    Position::new(line, want.min(len.saturating_sub(1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Blank,
    Word,
    Punct,
}

fn classify(g: &str, big: bool) -> CharClass {
    let c = g.chars().next().unwrap_or(' ');
    if c.is_whitespace() {
        CharClass::Blank
    } else if big || c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// Class of the character at `pos`; `None` at or past the end of the line.
fn class_at<B: TextBuffer + ?Sized>(buf: &B, pos: Position, big: bool) -> Option<CharClass> {
    let line = buf.line(pos.line);
    text::grapheme_at(&line, pos.col).map(|g| classify(g, big))
}

/// One character forward, crossing line ends. `None` at the end of the buffer.
fn next_pos<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<Position> {
    if pos.col + 1 < buf.line_len(pos.line) {
        Some(Position::new(pos.line, pos.col + 1))
    } else if pos.line + 1 < line_total(buf) {
        Some(Position::new(pos.line + 1, 0))
    } else {
        None
    }
}

/// One character back, crossing line starts. `None` at the start of the buffer.
fn prev_pos<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<Position> {
    if pos.col > 0 {
        let len = buf.line_len(pos.line);
        Some(Position::new(pos.line, (pos.col - 1).min(len.saturating_sub(1))))
    } else if pos.line > 0 {
        let line = pos.line - 1;
        Some(Position::new(line, buf.line_len(line).saturating_sub(1)))
    } else {
        None
    }
}

fn word_forward<B: TextBuffer + ?Sized>(
    buf: &B,
    from: Position,
    count: u32,
    big: bool,
    ctx: &MotionContext,
) -> MotionResult {
    // cw on a non-blank changes to the end of the word instead
    if ctx.change && matches!(class_at(buf, from, big), Some(c) if c != CharClass::Blank) {
        let mut pos = from;
        for i in 0..count {
            if i > 0 || !at_word_end(buf, pos, big) {
                pos = word_end_step(buf, pos, big);
            }
        }
        return MotionResult::inclusive(pos);
    }

    let mut pos = from;
    let mut step_start = from;
    for _ in 0..count {
        step_start = pos;
        pos = word_forward_step(buf, pos, big);
    }
    // an operator never drags the next line's first word in
    if ctx.operator_pending && pos.line > step_start.line {
        let line = step_start.line;
        pos = Position::new(line, buf.line_len(line));
        return MotionResult::exclusive(pos.max(from));
    }
    MotionResult::exclusive(pos)
}

fn at_word_end<B: TextBuffer + ?Sized>(buf: &B, pos: Position, big: bool) -> bool {
    let here = class_at(buf, pos, big);
    let next = class_at(buf, Position::new(pos.line, pos.col + 1), big);
    here != next
}

fn word_forward_step<B: TextBuffer + ?Sized>(buf: &B, from: Position, big: bool) -> Position {
    let total = line_total(buf);
    let mut pos = from;
    if let Some(cls) = class_at(buf, pos, big)
        && cls != CharClass::Blank
    {
        while class_at(buf, pos, big) == Some(cls) {
            pos.col += 1;
        }
    }
    loop {
        match class_at(buf, pos, big) {
            Some(CharClass::Blank) => pos.col += 1,
            Some(_) => return pos,
            None => {
                if pos.line + 1 >= total {
                    return Position::new(pos.line, buf.line_len(pos.line));
                }
                pos = Position::new(pos.line + 1, 0);
                // an empty line counts as a word
                if buf.line_len(pos.line) == 0 {
                    return pos;
                }
            }
        }
    }
}

fn word_end_step<B: TextBuffer + ?Sized>(buf: &B, from: Position, big: bool) -> Position {
    let Some(mut pos) = next_pos(buf, from) else {
        return from;
    };
    loop {
        match class_at(buf, pos, big) {
            None | Some(CharClass::Blank) => match next_pos(buf, pos) {
                Some(next) => pos = next,
                None => return pos,
            },
            Some(_) => break,
        }
    }
    let cls = class_at(buf, pos, big);
    while class_at(buf, Position::new(pos.line, pos.col + 1), big) == cls {
        pos.col += 1;
    }
    pos
}

fn word_backward_step<B: TextBuffer + ?Sized>(buf: &B, from: Position, big: bool) -> Position {
    let Some(mut pos) = prev_pos(buf, from) else {
        return Position::new(from.line, 0);
    };
    loop {
        if buf.line_len(pos.line) == 0 {
            return pos;
        }
        match class_at(buf, pos, big) {
            Some(CharClass::Blank) | None => match prev_pos(buf, pos) {
                Some(prev) => pos = prev,
                None => return pos,
            },
            Some(_) => break,
        }
    }
    let cls = class_at(buf, pos, big);
    while pos.col > 0 && class_at(buf, Position::new(pos.line, pos.col - 1), big) == cls {
        pos.col -= 1;
    }
    pos
}

fn paragraph_forward<B: TextBuffer + ?Sized>(buf: &B, from: Position, count: u32) -> Position {
    let last = buf.last_line();
    let mut line = from.line;
    for _ in 0..count {
        while line < last && buf.line_len(line) == 0 {
            line += 1;
        }
        while line < last && buf.line_len(line) != 0 {
            line += 1;
        }
    }
    if buf.line_len(line) != 0 {
        // no blank line left: the end of the buffer
        return Position::new(line, buf.line_len(line));
    }
    Position::new(line, 0)
}

fn paragraph_backward<B: TextBuffer + ?Sized>(buf: &B, from: Position, count: u32) -> Position {
    let mut line = from.line;
    for _ in 0..count {
        while line > 0 && buf.line_len(line) == 0 {
            line -= 1;
        }
        while line > 0 && buf.line_len(line) != 0 {
            line -= 1;
        }
    }
    Position::new(line, 0)
}

fn find_char<B: TextBuffer + ?Sized>(
    buf: &B,
    from: Position,
    spec: FindSpec,
    count: u32,
    repeat: bool,
) -> Option<MotionResult> {
    let line = buf.line(from.line);
    let cells = graphemes(&line);
    let matches = |col: usize| cells[col].starts_with(spec.ch);
    // a repeated till would stop on the same spot without the extra skip
    let skip = u32::from(spec.till && repeat);
    let mut remaining = count;
    if spec.forward {
        let start = (from.col + 1 + skip) as usize;
        for col in start..cells.len() {
            if matches(col) {
                remaining -= 1;
                if remaining == 0 {
                    let col = col as u32 - u32::from(spec.till);
                    return Some(MotionResult::inclusive(Position::new(from.line, col)));
                }
            }
        }
    } else {
        let end = from.col.saturating_sub(skip).min(cells.len() as u32) as usize;
        for col in (0..end).rev() {
            if matches(col) {
                remaining -= 1;
                if remaining == 0 {
                    let col = col as u32 + u32::from(spec.till);
                    return Some(MotionResult::exclusive(Position::new(from.line, col)));
                }
            }
        }
    }
    None
}

const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

fn match_pair<B: TextBuffer + ?Sized>(buf: &B, from: Position) -> Option<Position> {
    let line = buf.line(from.line);
    let cells = graphemes(&line);
    let (col, open, close, forward) =
        cells
            .iter()
            .enumerate()
            .skip(from.col as usize)
            .find_map(|(col, g)| {
                let c = g.chars().next()?;
                PAIRS.iter().find_map(|&(open, close)| {
                    if c == open {
                        Some((col, open, close, true))
                    } else if c == close {
                        Some((col, open, close, false))
                    } else {
                        None
                    }
                })
            })?;

    let mut depth = 0i32;
    let mut pos = Position::new(from.line, col as u32);
    loop {
        let line = buf.line(pos.line);
        let c = text::grapheme_at(&line, pos.col).and_then(|g| g.chars().next());
        if c == Some(open) {
            depth += if forward { 1 } else { -1 };
        } else if c == Some(close) {
            depth += if forward { -1 } else { 1 };
        }
        if depth == 0 {
            return Some(pos);
        }
        pos = if forward {
            next_pos(buf, pos)?
        } else {
            prev_pos(buf, pos)?
        };
    }
}
