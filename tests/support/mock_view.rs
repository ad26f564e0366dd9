use vim_core::traits::View;
use vim_core::types::{Position, Selection, VisualKind};

#[derive(Debug, Default, Clone)]
pub struct MockView {
    pub caret: Position,
    pub selection: Option<Selection>,
}

impl MockView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(line: u32, col: u32) -> Self {
        Self {
            caret: Position::new(line, col),
            selection: None,
        }
    }

    /// Selects from `anchor` to `caret` the way a mouse drag would.
    pub fn select(&mut self, anchor: Position, caret: Position, kind: VisualKind) {
        self.selection = Some(Selection::new(anchor, caret, kind));
        self.caret = caret;
    }
}

impl View for MockView {
    fn caret(&self) -> Position {
        self.caret
    }

    fn set_caret(&mut self, pos: Position) {
        self.caret = pos;
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }
}
