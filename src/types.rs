use serde::{Deserialize, Serialize};

/// A position within a text buffer.
///
/// Positions are zero-indexed and column values are counted in grapheme clusters,
/// not bytes or chars. This ensures correct handling of emoji and combining characters.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column position in grapheme clusters.
    pub col: u32,
}

impl Position {
    /// The origin position (0, 0).
    pub const ZERO: Position = Position { line: 0, col: 0 };

    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// A range of text defined by start and end positions.
///
/// Ranges are half-open intervals [start, end), meaning the start position
/// is included but the end position is excluded. An end of `(l + 1, 0)` covers
/// the line break that terminates line `l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// The start position (inclusive).
    pub start: Position,
    /// The end position (exclusive).
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// How an operator treats the boundaries of a span, and how register
/// contents are put back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Character-wise: exact start and end.
    Character,
    /// Line-wise: whole lines including their trailing line break.
    Line,
    /// Block-wise: the same column range on every line.
    Block,
}

/// A shaped span of text produced by a motion or a visual selection.
///
/// * `Character` spans are half-open `[start, end)`.
/// * `Line` spans run from `(first, 0)` to `(last, len(last))` and exclude the
///   final line break; the operator decides whether to consume it.
/// * `Block` spans cover lines `start.line..=end.line` and columns
///   `start.col..end.col` on each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
    pub shape: Shape,
}

impl Span {
    pub fn first_line(&self) -> u32 {
        self.start.line
    }

    /// Last line touched by the span. A character span ending at column 0 of a
    /// later line only covers the line break before it.
    pub fn last_line(&self) -> u32 {
        match self.shape {
            Shape::Character if self.end.col == 0 && self.end.line > self.start.line => {
                self.end.line - 1
            }
            _ => self.end.line,
        }
    }

    pub fn line_count(&self) -> u32 {
        self.last_line() - self.first_line() + 1
    }

    pub fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        match self.shape {
            Shape::Character => self.start >= self.end,
            Shape::Line => false,
            Shape::Block => self.start.col >= self.end.col,
        }
    }
}

/// The current mode of the vim engine.
///
/// Vim is a modal editor where the same keys perform different
/// actions depending on the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Normal mode - for navigation and operators.
    Normal,
    /// Insert mode - for typing text.
    Insert,
    /// Replace mode - typed text overwrites existing text.
    Replace,
    /// Visual mode - for selecting text.
    Visual(VisualKind),
    /// Command-line mode - entering an ex command after `:`.
    CommandLine,
}

impl Mode {
    pub fn is_visual(&self) -> bool {
        matches!(self, Mode::Visual(_))
    }
}

/// The type of visual selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    /// Character-wise selection (v).
    CharWise,
    /// Line-wise selection (V).
    LineWise,
    /// Block-wise selection (Ctrl-V).
    BlockWise,
}

impl VisualKind {
    pub fn shape(&self) -> Shape {
        match self {
            VisualKind::CharWise => Shape::Character,
            VisualKind::LineWise => Shape::Line,
            VisualKind::BlockWise => Shape::Block,
        }
    }
}

/// A visual selection as exchanged with the host view.
///
/// Both ends are inclusive character positions: the anchor stays put while
/// the caret moves. Either end may come first in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// The fixed end of the selection.
    pub anchor: Position,
    /// The free end, where the caret sits.
    pub caret: Position,
    /// The type of selection.
    pub kind: VisualKind,
}

impl Selection {
    pub fn new(anchor: Position, caret: Position, kind: VisualKind) -> Self {
        Self {
            anchor,
            caret,
            kind,
        }
    }

    /// The earlier and later ends in buffer order.
    pub fn ordered(&self) -> (Position, Position) {
        if self.anchor <= self.caret {
            (self.anchor, self.caret)
        } else {
            (self.caret, self.anchor)
        }
    }

    /// True when the caret sits before the anchor.
    pub fn is_reversed(&self) -> bool {
        self.caret < self.anchor
    }
}

/// Edit primitives the engine asks the host to perform.
///
/// Operators first build a plan out of these, check every range against the
/// buffer, and only then apply the whole plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Update the cursor position.
    SetCursor(Position),
    /// Set or clear the current selection.
    SetSelection(Option<Selection>),

    /// Delete text in the specified range.
    Delete { range: Range },
    /// Insert text at the specified position.
    InsertText { at: Position, text: String },
    /// Replace the text in a range.
    Replace { range: Range, text: String },
}

/// What happened to a key delivered to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key completed a command or edited text.
    Handled,
    /// The key was accepted into a pending command.
    Pending,
    /// The key was dropped; buffer, registers and mode are unchanged.
    Ignored,
}
