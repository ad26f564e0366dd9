use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;

use crate::types::{Position, Range, Selection};

/// The host's text storage.
///
/// Lines are addressed without their line break and columns are grapheme
/// clusters. Every edit the engine makes is one of the three primitives
/// below; the engine never reaches into the host's storage any other way.
pub trait TextBuffer {
    // Basic queries
    fn line_count(&self) -> u32;
    /// Text of `line` without its line break. Out of range lines are empty.
    fn line(&self, line: u32) -> Cow<'_, str>;

    // Edit primitives
    fn insert(&mut self, at: Position, text: &str);
    fn delete(&mut self, range: Range);
    fn replace(&mut self, range: Range, text: &str);

    /// Called before the edits of one dispatched command; hosts with an undo
    /// stack open a transaction here.
    fn begin_edit(&mut self) {}
    /// Closes the bracket opened by [`TextBuffer::begin_edit`]. Brackets may
    /// nest; the outermost pair is one undo step.
    fn end_edit(&mut self) {}

    fn line_len(&self, line: u32) -> u32 {
        self.line(line).graphemes(true).count() as u32
    }

    fn last_line(&self) -> u32 {
        self.line_count().saturating_sub(1)
    }

    fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.last_line());
        let col = pos.col.min(self.line_len(line));
        Position { line, col }
    }
}

/// The host's caret and selection.
pub trait View {
    fn caret(&self) -> Position;
    fn set_caret(&mut self, pos: Position);

    /// The current selection, if any. `None` means nothing is selected.
    fn selection(&self) -> Option<Selection>;
    fn set_selection(&mut self, selection: Selection);
    fn clear_selection(&mut self);
}

/// Backing store for the `+` and `*` registers.
pub trait Clipboard {
    fn get(&mut self) -> Option<String>;
    fn set(&mut self, text: String);
}

/// Scalar options the engine reads from the host on every access.
pub trait Settings {
    /// Columns added or removed by one shift.
    fn shift_width(&self) -> u32;
    /// Display width of a tab character.
    fn tab_stop(&self) -> u32;
    /// Indent with spaces only.
    fn expand_tab(&self) -> bool;
    /// Register used when a command names none.
    fn default_register(&self) -> char {
        '"'
    }
}
