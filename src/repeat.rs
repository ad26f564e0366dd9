//! The last change, kept as a replayable description rather than keystrokes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VimError};
use crate::motion::Motion;
use crate::operator::Operator;
use crate::register::RegisterName;
use crate::traits::TextBuffer;
use crate::types::{Position, Selection, Shape, Span, VisualKind};

/// How Insert mode was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertKind {
    /// `i`
    Before,
    /// `a`
    After,
    /// `I`
    LineStart,
    /// `A`
    LineEnd,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
}

/// The size of a visual selection, re-anchored at the caret on repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualExtent {
    /// A character selection. On one line `width` is its length; across lines
    /// `width` is the last line's end column (exclusive).
    Character { lines: u32, width: u32 },
    Line { lines: u32 },
    Block { lines: u32, width: u32 },
}

impl VisualExtent {
    pub fn of(span: &Span) -> Self {
        let lines = span.line_count();
        match span.shape {
            Shape::Character if span.end.line > span.start.line => VisualExtent::Character {
                lines: span.end.line - span.start.line + 1,
                width: span.end.col,
            },
            Shape::Line => VisualExtent::Line { lines },
            Shape::Block => VisualExtent::Block {
                lines,
                width: span.end.col - span.start.col,
            },
            Shape::Character => VisualExtent::Character {
                lines: 1,
                width: span.end.col.saturating_sub(span.start.col).max(1),
            },
        }
    }

    /// The span of the same size starting at `caret`, clamped to the buffer.
    pub fn span_at<B: TextBuffer + ?Sized>(&self, buf: &B, caret: Position) -> Span {
        let caret = buf.clamp(caret);
        match *self {
            VisualExtent::Line { lines } => {
                let last = caret.line.saturating_add(lines - 1).min(buf.last_line());
                Span {
                    start: Position::new(caret.line, 0),
                    end: Position::new(last, buf.line_len(last)),
                    shape: Shape::Line,
                }
            }
            VisualExtent::Block { lines, width } => {
                let last = caret.line.saturating_add(lines - 1).min(buf.last_line());
                Span {
                    start: caret,
                    end: Position::new(last, caret.col + width),
                    shape: Shape::Block,
                }
            }
            VisualExtent::Character { lines: 1, width } => Span {
                start: caret,
                end: Position::new(caret.line, (caret.col + width).min(buf.line_len(caret.line))),
                shape: Shape::Character,
            },
            VisualExtent::Character { lines, width } => {
                let last = caret.line.saturating_add(lines - 1).min(buf.last_line());
                Span {
                    start: caret,
                    end: Position::new(last, width.min(buf.line_len(last))),
                    shape: Shape::Character,
                }
            }
        }
    }
}

/// The span a visual selection covers.
pub fn selection_span<B: TextBuffer + ?Sized>(buf: &B, selection: &Selection) -> Span {
    let (start, end) = selection.ordered();
    let start = buf.clamp(start);
    let end = buf.clamp(end);
    match selection.kind {
        VisualKind::CharWise => Span {
            start,
            end: crate::motion::step_past(buf, end),
            shape: Shape::Character,
        },
        VisualKind::LineWise => Span {
            start: Position::new(start.line, 0),
            end: Position::new(end.line, buf.line_len(end.line)),
            shape: Shape::Line,
        },
        VisualKind::BlockWise => {
            let left = selection.anchor.col.min(selection.caret.col);
            let right = selection.anchor.col.max(selection.caret.col) + 1;
            Span {
                start: Position::new(start.line, left),
                end: Position::new(end.line, right),
                shape: Shape::Block,
            }
        }
    }
}

/// What an operator was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorTarget {
    Motion(Motion),
    /// A doubled operator (`dd`, `>>`): whole lines from the caret.
    Lines,
    Visual(VisualExtent),
}

/// A completed change, replayable at the current caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeDescriptor {
    Operator {
        op: Operator,
        target: OperatorTarget,
        /// Total count (operator count times motion count), or the shift
        /// multiplier for visual targets.
        count: Option<u32>,
        register: Option<RegisterName>,
        /// Text typed after a change operator, before Escape.
        inserted: Option<String>,
    },
    Insert {
        kind: InsertKind,
        count: Option<u32>,
        text: String,
    },
    Put {
        before: bool,
        count: Option<u32>,
        register: Option<RegisterName>,
    },
    ReplaceChar {
        ch: char,
        count: Option<u32>,
    },
    JoinLines {
        count: Option<u32>,
    },
    ToggleCaseChars {
        count: Option<u32>,
    },
    /// Text typed in Replace mode.
    Overwrite {
        text: String,
        count: Option<u32>,
    },
}

impl ChangeDescriptor {
    pub fn count(&self) -> Option<u32> {
        match self {
            ChangeDescriptor::Operator { count, .. }
            | ChangeDescriptor::Insert { count, .. }
            | ChangeDescriptor::Put { count, .. }
            | ChangeDescriptor::ReplaceChar { count, .. }
            | ChangeDescriptor::JoinLines { count }
            | ChangeDescriptor::ToggleCaseChars { count }
            | ChangeDescriptor::Overwrite { count, .. } => *count,
        }
    }

    /// The same change with its count replaced.
    pub fn with_count(mut self, new: u32) -> Self {
        match &mut self {
            ChangeDescriptor::Operator { count, .. }
            | ChangeDescriptor::Insert { count, .. }
            | ChangeDescriptor::Put { count, .. }
            | ChangeDescriptor::ReplaceChar { count, .. }
            | ChangeDescriptor::JoinLines { count }
            | ChangeDescriptor::ToggleCaseChars { count }
            | ChangeDescriptor::Overwrite { count, .. } => *count = Some(new),
        }
        self
    }
}

/// Holds the most recent change of one buffer.
#[derive(Debug, Default, Clone)]
pub struct RepeatEngine {
    last: Option<ChangeDescriptor>,
}

impl RepeatEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `change`, replacing whatever was recorded before.
    pub fn record_change(&mut self, change: ChangeDescriptor) {
        debug!(?change, "recorded change");
        self.last = Some(change);
    }

    pub fn last(&self) -> Option<&ChangeDescriptor> {
        self.last.as_ref()
    }

    /// The change to replay, with `override_count` in place of its stored
    /// count when given.
    pub fn repeat_last(&self, override_count: Option<u32>) -> Result<ChangeDescriptor> {
        let change = self.last.clone().ok_or(VimError::NoPriorChange)?;
        Ok(match override_count {
            Some(count) => change.with_count(count),
            None => change,
        })
    }
}

/// Clamps a count typed by the user.
pub(crate) fn clamp_count(count: u32) -> u32 {
    count.clamp(1, crate::parser::MAX_COUNT)
}

/// Span of `lines` whole lines from `line`, clamped to the buffer.
pub(crate) fn lines_from<B: TextBuffer + ?Sized>(buf: &B, line: u32, lines: u32) -> Span {
    let last = line.saturating_add(lines.max(1) - 1).min(buf.last_line());
    let first = line.min(last);
    Span {
        start: Position::new(first, 0),
        end: Position::new(last, buf.line_len(last)),
        shape: Shape::Line,
    }
}
